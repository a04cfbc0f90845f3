use super::*;

#[test]
fn local_request_omits_system_when_absent() {
    let body = LocalRequest { prompt: "hi", system: None, max_tokens: 64 };
    let json = serde_json::to_string(&body).expect("serializes");
    assert!(!json.contains("system"));
}

#[test]
fn local_response_defaults_token_counts_when_absent() {
    let parsed: LocalResponse = serde_json::from_str(r#"{"text":"hello"}"#).expect("parses");
    assert_eq!(parsed.text, "hello");
    assert_eq!(parsed.input_tokens, 0);
    assert_eq!(parsed.output_tokens, 0);
}
