use super::*;

fn sample() -> &'static str {
    r#"
project "dashflow" {
  path        = "/home/op/work/dashflow"
  description = "internal metrics dashboard"
  triggers    = ["dashflow", "the dashboard"]
  timeout_s   = 120

  commands = {
    test = "pytest {path}"
    lint = "ruff check {path}"
  }
}

project "reports" {
  path        = "/home/op/work/reports"
  description = "weekly report generator"
  triggers    = ["reports", "the dashboard stats"]
}
"#
}

#[test]
fn loads_projects_in_file_order() {
    let registry = ProjectRegistry::parse(sample(), Path::new("registry.hcl")).expect("parses");
    let names: Vec<&str> = registry.projects().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["dashflow", "reports"]);
}

#[test]
fn reads_commands_and_defaults() {
    let registry = ProjectRegistry::parse(sample(), Path::new("registry.hcl")).expect("parses");
    let dashflow = registry.by_name("dashflow").expect("present");
    assert_eq!(dashflow.commands.get("test"), Some(&"pytest {path}".to_string()));
    assert_eq!(dashflow.timeout_s, 120);

    let reports = registry.by_name("reports").expect("present");
    assert_eq!(reports.timeout_s, DEFAULT_TIMEOUT_S);
    assert!(!reports.requires_file);
}

#[test]
fn match_trigger_prefers_longest_match() {
    let registry = ProjectRegistry::parse(sample(), Path::new("registry.hcl")).expect("parses");
    let matched = registry.match_trigger("can you check the dashboard stats").expect("a project matches");
    assert_eq!(matched.name, "reports");
}

#[test]
fn match_trigger_returns_none_when_nothing_matches() {
    let registry = ProjectRegistry::parse(sample(), Path::new("registry.hcl")).expect("parses");
    assert!(registry.match_trigger("write me a haiku").is_none());
}

#[test]
fn project_matches_is_case_insensitive() {
    let registry = ProjectRegistry::parse(sample(), Path::new("registry.hcl")).expect("parses");
    let dashflow = registry.by_name("dashflow").expect("present");
    assert!(dashflow.matches("DASHFLOW is broken"));
}
