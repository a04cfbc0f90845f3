use super::*;

#[test]
fn strips_home_prefix() {
    std::env::set_var("HOME", "/home/operator");
    assert_eq!(strip_home_prefix("/home/operator/project/out.csv"), "~/project/out.csv");
}

#[test]
fn redacts_bearer_and_api_key_fragments() {
    let msg = "request failed: Bearer abc123xyz rejected, key sk-ant-oeuoeuoeu invalid";
    let out = sanitize_message(msg);
    assert!(!out.contains("abc123xyz"));
    assert!(!out.contains("oeuoeuoeu"));
    assert!(out.contains("Bearer ***"));
}

#[test]
fn truncate_chars_appends_ellipsis_only_when_truncated() {
    assert_eq!(truncate_chars("short", 10), "short");
    assert_eq!(truncate_chars("abcdefghij", 5), "abcde\u{2026}");
}
