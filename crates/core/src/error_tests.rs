use super::*;

#[test]
fn model_transient_and_empty_are_retried() {
    assert!(TaskdError::ModelTransient("429".into()).is_transient());
    assert!(TaskdError::ModelEmpty.is_transient());
}

#[test]
fn other_kinds_are_not_retried() {
    assert!(!TaskdError::BudgetExceeded("daily cap".into()).is_transient());
    assert!(!TaskdError::RefusedBySafety("rm -rf /".into()).is_transient());
    assert!(!TaskdError::GuardRejected("concurrency cap".into()).is_transient());
}

#[test]
fn sanitized_strips_home_prefix() {
    std::env::set_var("HOME", "/home/operator");
    let err = TaskdError::EnvironmentError("no such file /home/operator/project/x".into());
    assert_eq!(err.sanitized(), "environment error: no such file ~/project/x");
}
