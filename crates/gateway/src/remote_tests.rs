use super::*;

#[test]
fn thinking_config_budget_is_clamped_to_a_floor() {
    let req = CompletionRequest {
        prompt: "hi".to_string(),
        system: None,
        max_tokens: 100,
        enable_thinking: true,
    };
    let thinking_budget = if req.enable_thinking { req.max_tokens / 2 } else { 0 };
    assert_eq!(thinking_budget.max(1024), 1024);
}

#[test]
fn anthropic_error_envelope_parses_type_and_message() {
    let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"try again"}}"#;
    let parsed: AnthropicErrorEnvelope = serde_json::from_str(body).expect("parses");
    assert_eq!(parsed.error.error_type, "overloaded_error");
    assert_eq!(parsed.error.message, "try again");
}

#[test]
fn anthropic_response_concatenates_text_blocks_and_skips_others() {
    let body = r#"{
        "content": [
            {"type": "text", "text": "hello "},
            {"type": "tool_use"},
            {"type": "text", "text": "world"}
        ],
        "usage": {"input_tokens": 12, "output_tokens": 34}
    }"#;
    let parsed: AnthropicResponse = serde_json::from_str(body).expect("parses");
    let content: String =
        parsed.content.iter().filter(|b| b.kind == "text").map(|b| b.text.as_str()).collect();
    assert_eq!(content, "hello world");
    assert_eq!(parsed.usage.input_tokens, 12);
    assert_eq!(parsed.usage.output_tokens, 34);
}

#[test]
fn request_serializes_without_thinking_when_disabled() {
    let body = AnthropicRequest {
        model: "claude-test".to_string(),
        max_tokens: 512,
        messages: vec![AnthropicMessage { role: "user", content: "hi".to_string() }],
        system: None,
        thinking: None,
    };
    let json = serde_json::to_string(&body).expect("serializes");
    assert!(!json.contains("thinking"));
    assert!(!json.contains("system"));
}
