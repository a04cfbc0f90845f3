use super::*;

#[test]
fn detects_python_module_not_found() {
    let stderr = "Traceback (most recent call last):\nModuleNotFoundError: No module named 'requests'";
    let (_, package, _) = detect_missing_package(stderr).unwrap();
    assert_eq!(package, "requests");
}

#[test]
fn renames_known_import_to_install_name() {
    let stderr = "ModuleNotFoundError: No module named 'cv2'";
    let (_, package, _) = detect_missing_package(stderr).unwrap();
    assert_eq!(package, "opencv-python");
}

#[test]
fn detects_node_module_not_found() {
    let stderr = "Error: Cannot find module 'lodash'\n    at Function.Module._resolveFilename";
    let (_, package, _) = detect_missing_package(stderr).unwrap();
    assert_eq!(package, "lodash");
}

#[test]
fn no_match_on_unrelated_error() {
    assert!(detect_missing_package("ValueError: invalid literal for int()").is_none());
}

#[test]
fn retry_budgets_differ_by_context() {
    assert_eq!(RetryBudget::FreeForm.max_attempts(), 2);
    assert_eq!(RetryBudget::Project.max_attempts(), 5);
}

#[tokio::test]
async fn run_with_autoinstall_returns_immediately_on_success() {
    let result = run_with_autoinstall(
        "echo",
        &["ok".to_string()],
        std::path::Path::new("/tmp"),
        &HashMap::new(),
        Duration::from_secs(5),
        RetryBudget::FreeForm,
        None,
    )
    .await
    .unwrap();
    assert!(result.success);
    assert!(result.auto_installed.is_empty());
}

#[tokio::test]
async fn run_with_autoinstall_gives_up_without_a_recognised_error() {
    let result = run_with_autoinstall(
        "false",
        &[],
        std::path::Path::new("/tmp"),
        &HashMap::new(),
        Duration::from_secs(5),
        RetryBudget::FreeForm,
        None,
    )
    .await
    .unwrap();
    assert!(!result.success);
    assert!(result.auto_installed.is_empty());
}
