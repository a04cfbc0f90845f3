use super::*;
use tempfile::tempdir;

#[test]
fn resource_limits_default_is_sane() {
    let limits = ResourceLimits::default();
    assert_eq!(limits.memory_mb, 1024);
    assert_eq!(limits.pids_limit, 256);
}

#[test]
fn validate_working_dir_accepts_path_under_home() {
    let home = dirs::home_dir().expect("test environment has $HOME");
    let dir = tempfile::tempdir_in(&home).expect("can create tempdir under $HOME");
    let validated = ContainerBackend::validate_working_dir(dir.path()).unwrap();
    assert!(validated.starts_with(&home));
}

#[test]
fn validate_working_dir_rejects_path_outside_home() {
    let dir = tempdir().unwrap();
    let home = dirs::home_dir().expect("test environment has $HOME");
    if dir.path().canonicalize().unwrap().starts_with(&home) {
        // System temp dir happens to live under $HOME in this environment;
        // nothing to assert.
        return;
    }
    assert!(ContainerBackend::validate_working_dir(dir.path()).is_err());
}

#[test]
fn validate_working_dir_rejects_missing_path() {
    let missing = std::path::Path::new("/nonexistent/taskd-sandbox-test-path");
    assert!(ContainerBackend::validate_working_dir(missing).is_err());
}

#[tokio::test]
async fn is_available_caches_result_across_calls() {
    let backend = ContainerBackend::new("alpine:latest", ResourceLimits::default(), None);
    let first = backend.is_available().await;
    let checked_at = backend.last_checked_ms.load(std::sync::atomic::Ordering::Relaxed);
    let second = backend.is_available().await;
    assert_eq!(first, second);
    assert_eq!(checked_at, backend.last_checked_ms.load(std::sync::atomic::Ordering::Relaxed));
}
