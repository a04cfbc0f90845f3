use super::*;

#[test]
fn purpose_as_str_matches_gateway_call_purpose_field() {
    assert_eq!(Purpose::Classify.as_str(), "classify");
    assert_eq!(Purpose::CodeGen.as_str(), "code_gen");
    assert_eq!(Purpose::Audit.to_string(), "audit");
}
