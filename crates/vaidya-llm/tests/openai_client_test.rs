use mockito::Matcher;
use vaidya_llm::{ChatClient, ChatOptions, ChatRequest, Message, OpenAIClient};

const COMPLETION: &str = r#"{
    "id": "chatcmpl-1",
    "object": "chat.completion",
    "created": 1700000000,
    "model": "llama3-70b-8192",
    "choices": [{
        "index": 0,
        "message": {"role": "assistant", "content": "Disease Name:\nMigraine"},
        "finish_reason": "stop"
    }],
    "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
}"#;

#[tokio::test]
async fn test_chat_reads_first_choice_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "llama3-70b-8192",
            "messages": [{"role": "user", "content": "migraine"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(COMPLETION)
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("test-key", server.url()).unwrap();
    let request = ChatRequest::new("llama3-70b-8192", vec![Message::human("migraine")])
        .with_options(ChatOptions::new().max_tokens(2000));

    let response = client.chat(request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.content.as_deref(), Some("Disease Name:\nMigraine"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.unwrap().total_tokens, 15);
}

#[tokio::test]
async fn test_chat_surfaces_http_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("test-key", server.url()).unwrap();
    let err = client
        .chat(ChatRequest::new("llama3-70b-8192", vec![Message::human("hi")]))
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("429"));
    assert!(msg.contains("rate limited"));
}

#[tokio::test]
async fn test_chat_without_choices_has_no_content() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let client = OpenAIClient::with_base_url("test-key", server.url()).unwrap();
    let response = client
        .chat(ChatRequest::new("llama3-70b-8192", vec![Message::human("hi")]))
        .await
        .unwrap();

    assert!(response.content.is_none());
    assert!(response.usage.is_none());
}
