use super::*;

#[test]
fn refuse_if_unsafe_blocks_tier1_match() {
    let err = refuse_if_unsafe("sudo rm -rf /", false).unwrap_err();
    assert!(err.is_refusal());
}

#[test]
fn refuse_if_unsafe_blocks_tier4_match_outside_container() {
    let err = refuse_if_unsafe("os.system('rm -rf /')", false).unwrap_err();
    assert!(err.is_refusal());
}

#[test]
fn refuse_if_unsafe_skips_tier4_when_container_active() {
    assert!(refuse_if_unsafe("os.system('echo hi')", true).is_ok());
}

#[test]
fn refuse_if_unsafe_allows_ordinary_code() {
    assert!(refuse_if_unsafe("print('hello world')", false).is_ok());
}
