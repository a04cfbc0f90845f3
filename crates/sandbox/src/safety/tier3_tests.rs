use super::*;

#[test]
fn audits_pip_install_without_blocking() {
    let audited = scan("pip install requests");
    assert_eq!(audited.len(), 1);
    assert_eq!(audited[0].label, "package install");
}

#[test]
fn audits_curl_fetch() {
    let audited = scan("curl https://example.com/data.json -o data.json");
    assert_eq!(audited.len(), 1);
}

#[test]
fn ordinary_line_produces_no_audit_entries() {
    assert!(scan("print('hello world')").is_empty());
}
