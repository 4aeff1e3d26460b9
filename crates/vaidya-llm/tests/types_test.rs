use vaidya_llm::{ChatOptions, ChatRequest, Message, Role};

#[test]
fn test_message_system() {
    let msg = Message::system("You are an expert Ayurvedic doctor");
    assert_eq!(msg.role(), "system");
}

#[test]
fn test_message_human() {
    let msg = Message::human("Hello");
    assert_eq!(msg.role(), "user");
    assert_eq!(msg.content(), "Hello");
}

#[test]
fn test_message_ai() {
    let msg = Message::ai("Hi there!");
    assert_eq!(msg.role(), "assistant");
}

#[test]
fn test_message_serialization_human() {
    let msg = Message::human("Hello");
    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"role\":\"user\""));
    assert!(json.contains("Hello"));
}

#[test]
fn test_message_deserialization() {
    let json = r#"{"role":"assistant","content":"Causes:"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg, Message::ai("Causes:"));
}

#[test]
fn test_chat_request_with_options() {
    let request = ChatRequest::new("llama3-70b-8192", vec![Message::human("Hello")])
        .with_options(ChatOptions::new().temperature(0.7).max_tokens(2000).top_p(0.9));

    assert_eq!(request.model, "llama3-70b-8192");
    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.options.max_tokens, Some(2000));
    assert_eq!(request.options.top_p, Some(0.9));
}

#[test]
fn test_chat_options_default() {
    let options = ChatOptions::default();

    assert_eq!(options.temperature, None);
    assert_eq!(options.max_tokens, None);
    assert_eq!(options.top_p, None);
}

#[test]
fn test_options_serialize_only_set_fields() {
    let json = serde_json::to_value(ChatOptions::new().max_tokens(2000)).unwrap();
    assert_eq!(json, serde_json::json!({"max_tokens": 2000}));
    assert_eq!(Role::Assistant.to_string(), "assistant");
}
