//! Turns a labeled-section model answer into display markup.
//!
//! The answer is read line by line through a small state machine. A line
//! ending in `:` is a heading; [`HEADINGS`] decides which section it opens
//! (first match wins) and [`transition`] emits the markup that closes the
//! previous section and opens the next. Every other line is rendered
//! according to the current [`SectionState`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Section the machine is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    None,
    Title,
    List,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Title,
    Causes,
    Remedies,
    Exercises,
    Diet,
    Notes,
    Generic,
}

/// Ordered keyword table; matched case-insensitively as substrings.
pub const HEADINGS: &[(HeadingKind, &[&str])] = &[
    (HeadingKind::Title, &["disease", "problem", "issue", "condition"]),
    (HeadingKind::Causes, &["cause", "reason"]),
    (HeadingKind::Remedies, &["remedy", "treatment", "solution"]),
    (HeadingKind::Exercises, &["exercise", "yoga", "physical"]),
    (HeadingKind::Diet, &["diet", "food", "nutrition"]),
    (HeadingKind::Notes, &["note", "additional", "advice"]),
];

const H2_OPEN: &str = r#"<h2 class="text-[#668400] text-xl mt-0 mb-4"><strong>"#;
const H2_CLOSE: &str = "</strong></h2>";
const H3_OPEN: &str = r#"<h3 class="text-[#668400] text-lg mt-5 mb-3">"#;
const LIST_OPEN: &str = r#"<ul class="pl-6 mb-4">"#;
const NOTES_OPEN: &str = r#"<div class="bg-[#292929] p-4 rounded-md my-4">"#;
const ITEM_OPEN: &str = r#"<li class="mb-2 leading-relaxed">"#;
const PLAIN_OPEN: &str = r#"<div class="whitespace-pre-wrap leading-relaxed">"#;

/// Bare capitalised words inside a list are stray labels, not items.
static SINGLE_WORD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Z][a-z]+$").ok());

/// A heading line, classified. For [`HeadingKind::Title`], `text` is the
/// subject the title names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub kind: HeadingKind,
    pub text: String,
}

pub fn classify(name: &str) -> HeadingKind {
    let lower = name.to_lowercase();
    HEADINGS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(kind, _)| *kind)
        .unwrap_or(HeadingKind::Generic)
}

/// The section name of a heading line (first `:` removed), or `None` for body lines.
pub fn heading_name(line: &str) -> Option<String> {
    if line.ends_with(':') {
        Some(line.replacen(':', "", 1).trim().to_string())
    } else {
        None
    }
}

/// `(state, heading) -> (next state, markup)`.
pub fn transition(state: SectionState, heading: &Heading) -> (SectionState, String) {
    let mut markup = close(state).to_string();
    let next = match heading.kind {
        HeadingKind::Title => {
            markup.push_str(&title(&heading.text));
            SectionState::Title
        }
        HeadingKind::Causes => list_section(&mut markup, "Causes"),
        HeadingKind::Remedies => list_section(&mut markup, "Ayurvedic Remedies"),
        HeadingKind::Exercises => list_section(&mut markup, "Recommended Exercises"),
        HeadingKind::Diet => list_section(&mut markup, "Diet Recommendations"),
        HeadingKind::Notes => {
            markup.push_str(&format!("{}Additional Notes</h3>{}", H3_OPEN, NOTES_OPEN));
            SectionState::Paragraph
        }
        HeadingKind::Generic => {
            markup.push_str(&format!("{}{}</h3><div>", H3_OPEN, escape(&heading.text)));
            SectionState::Paragraph
        }
    };
    (next, markup)
}

fn list_section(markup: &mut String, label: &str) -> SectionState {
    markup.push_str(&format!("{}{}</h3>{}", H3_OPEN, label, LIST_OPEN));
    SectionState::List
}

fn close(state: SectionState) -> &'static str {
    match state {
        SectionState::List => "</ul>",
        SectionState::Paragraph => "</div>",
        SectionState::None | SectionState::Title => "",
    }
}

fn title(subject: &str) -> String {
    format!("{}Ayurvedic Remedies for {}{}", H2_OPEN, escape(subject), H2_CLOSE)
}

#[derive(Debug, Default)]
struct SectionMachine {
    state: SectionState,
    has_title: bool,
    out: String,
}

impl SectionMachine {
    fn heading(&mut self, heading: &Heading) {
        if heading.kind == HeadingKind::Title {
            self.has_title = true;
        }
        let (next, markup) = transition(self.state, heading);
        self.state = next;
        self.out.push_str(&markup);
    }

    fn body(&mut self, line: &str) {
        match self.state {
            SectionState::List => {
                if SINGLE_WORD.as_ref().is_some_and(|re| re.is_match(line)) {
                    return;
                }
                let item = line.strip_prefix("- ").unwrap_or(line);
                let item = item.strip_prefix("• ").unwrap_or(item).trim();
                self.out.push_str(&format!("{}{}</li>", ITEM_OPEN, escape(item)));
            }
            SectionState::Paragraph => {
                self.out.push_str(&escape(line));
                self.out.push_str("<br/>");
            }
            SectionState::None | SectionState::Title => {
                if !self.has_title {
                    self.has_title = true;
                    self.out.push_str(&title(line));
                }
            }
        }
    }

    fn finish(mut self) -> String {
        self.out.push_str(close(self.state));
        self.out
    }
}

/// Formats a model answer. Total: any input yields markup.
///
/// Emphasis markers (`*`) are dropped first. Text without a single heading
/// line is returned verbatim, trimmed, in one pre-wrapped block; only
/// section markup escapes the text it interpolates.
pub fn format_response(text: &str) -> String {
    let cleaned = text.replace('*', "");
    let cleaned = cleaned.trim();
    let lines: Vec<&str> = cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if !lines.iter().any(|line| line.ends_with(':')) {
        return format!("{}{}</div>", PLAIN_OPEN, cleaned);
    }

    let mut machine = SectionMachine::default();
    let mut lines = lines.into_iter();
    while let Some(line) = lines.next() {
        match heading_name(line) {
            Some(name) => {
                let kind = classify(&name);
                let text = if kind == HeadingKind::Title {
                    // The title names the line that follows the heading.
                    lines.next().map(str::to_string).unwrap_or(name)
                } else {
                    name
                };
                machine.heading(&Heading { kind, text });
            }
            None => machine.body(line),
        }
    }
    machine.finish()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
