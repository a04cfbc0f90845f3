use super::*;

#[test]
fn is_empty_true_for_whitespace_only_content() {
    let response =
        CompletionResponse { content: "   \n".to_string(), input_tokens: 10, output_tokens: 0, thinking_tokens: 5 };
    assert!(response.is_empty());
}

#[test]
fn is_empty_false_for_real_content() {
    let response =
        CompletionResponse { content: "hello".to_string(), input_tokens: 10, output_tokens: 2, thinking_tokens: 0 };
    assert!(!response.is_empty());
}
