use super::*;

#[test]
fn extracts_distinct_placeholders_in_order() {
    let names = extract_placeholders("cp {src} {dest} {src}");
    assert_eq!(names, vec!["src".to_string(), "dest".to_string()]);
}

#[test]
fn fills_known_placeholders_with_shell_quoting() {
    let mut values = HashMap::new();
    values.insert("path".to_string(), "it's a path".to_string());
    let filled = fill_placeholders("pytest {path}", &values);
    assert_eq!(filled, "pytest 'it'\\''s a path'");
}

#[test]
fn leaves_unknown_placeholders_untouched() {
    let filled = fill_placeholders("run {missing}", &HashMap::new());
    assert_eq!(filled, "run {missing}");
}
