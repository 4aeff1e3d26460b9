use vaidya_chat::format_response;

const FULL_ANSWER: &str = "\
**Disease Name:**
Acid Reflux

**Causes:**
- Excess Pitta
- Late-night meals

Ayurvedic Remedies:
- Amla powder with water

Recommended Exercises:
- Vajrasana after meals (10 minutes)

Diet Recommendations:
- Favour cooling foods

Additional Notes:
Consult a practitioner if symptoms persist.
";

#[test]
fn test_full_answer_sections_render_in_order() {
    let html = format_response(FULL_ANSWER);

    let order = [
        "Ayurvedic Remedies for Acid Reflux",
        ">Causes</h3>",
        ">Excess Pitta</li>",
        ">Late-night meals</li>",
        ">Ayurvedic Remedies</h3>",
        ">Recommended Exercises</h3>",
        ">Diet Recommendations</h3>",
        ">Additional Notes</h3>",
        "Consult a practitioner if symptoms persist.<br/>",
    ];
    let mut cursor = 0;
    for needle in order {
        let found = html[cursor..]
            .find(needle)
            .unwrap_or_else(|| panic!("{} missing after byte {} in {}", needle, cursor, html));
        cursor += found + needle.len();
    }
    assert!(!html.contains('*'));
    assert!(html.ends_with("</div>"));
}

#[test]
fn test_every_opened_container_is_closed() {
    let html = format_response(FULL_ANSWER);
    assert_eq!(html.matches("<ul").count(), html.matches("</ul>").count());
    assert_eq!(html.matches("<div").count(), html.matches("</div>").count());
}
