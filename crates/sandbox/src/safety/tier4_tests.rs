use super::*;

#[test]
fn blocks_os_system() {
    assert!(is_blocked("import os\nos.system('rm -rf /tmp/x')"));
}

#[test]
fn blocks_shell_true_subprocess() {
    assert!(is_blocked("subprocess.run(cmd, shell=True)"));
}

#[test]
fn blocks_passwd_read() {
    assert!(is_blocked("with open('/etc/passwd') as f:\n    data = f.read()"));
}

#[test]
fn allows_ordinary_python() {
    assert!(!is_blocked("import pandas as pd\ndf = pd.read_csv('data.csv')\nprint(df.head())"));
}
