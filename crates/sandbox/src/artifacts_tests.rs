use super::*;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn sentinel_line_parses_json_array() {
    let stdout = "building...\nARTIFACTS: [\"out.csv\", \"report.pdf\"]\ndone";
    let artifacts = from_sentinel(stdout).unwrap();
    assert_eq!(artifacts, vec![PathBuf::from("out.csv"), PathBuf::from("report.pdf")]);
}

#[test]
fn no_sentinel_returns_none() {
    assert!(from_sentinel("just some normal output").is_none());
}

#[tokio::test]
async fn diff_since_finds_new_files_and_excludes_noise() {
    let dir = tempdir().unwrap();
    let before = snapshot_before(dir.path()).await;

    std::thread::sleep(std::time::Duration::from_millis(10));
    let mut f = std::fs::File::create(dir.path().join("result.csv")).unwrap();
    f.write_all(b"a,b,c\n1,2,3\n").unwrap();
    std::fs::File::create(dir.path().join("scratch.tmp")).unwrap().write_all(b"x").unwrap();
    std::fs::create_dir(dir.path().join("node_modules")).unwrap();
    std::fs::File::create(dir.path().join("node_modules/ignored.js")).unwrap().write_all(b"x").unwrap();

    let found = diff_since(dir.path(), &before).await;
    assert_eq!(found, vec![dir.path().join("result.csv")]);
}

#[tokio::test]
async fn diff_since_ignores_empty_files() {
    let dir = tempdir().unwrap();
    let before = snapshot_before(dir.path()).await;
    std::fs::File::create(dir.path().join("empty.txt")).unwrap();
    assert!(diff_since(dir.path(), &before).await.is_empty());
}
