use super::*;
use std::io::Write;

#[test]
fn missing_file_returns_empty_string() {
    let text = load(Path::new("/nonexistent/standards.md"), 100).expect("ok on missing file");
    assert_eq!(text, "");
}

#[test]
fn short_file_is_returned_whole() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, "use snake_case").expect("write");
    let text = load(file.path(), 1000).expect("reads");
    assert_eq!(text, "use snake_case");
}

#[test]
fn long_file_is_truncated_to_char_cap() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    write!(file, "{}", "x".repeat(500)).expect("write");
    let text = load(file.path(), 10).expect("reads");
    assert_eq!(text.chars().count(), 10);
}
