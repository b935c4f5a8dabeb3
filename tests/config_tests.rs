use std::io::Write;
use std::path::PathBuf;

use routecomb::{load_rules, Error, RuleFile};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create rule file");
    file.write_all(contents.as_bytes()).expect("write rule file");
    path
}

fn action_for(file: &RuleFile, method: &str, target: &str) -> Option<String> {
    let router = file.finalize().expect("builds");
    let result = router.route(method, target).map(|m| m.action.clone());
    result
}

#[test]
fn test_load_yaml_rules() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "routes.yaml",
        r#"
options:
  trim: true
rules:
  - url: /users/*
    method: "{GET,HEAD}"
    action: show_user
  - url: /search?q
    headers: accept
    action: search
"#,
    );
    let file = load_rules(&path).expect("loads");
    assert!(file.options.trim);
    assert_eq!(file.rules.len(), 2);
    assert_eq!(action_for(&file, "HEAD", "/users/7/").as_deref(), Some("show_user"));
}

#[test]
fn test_load_toml_rules() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "routes.toml",
        r#"
[options]
case = true

[[rules]]
url = "/Items/(\\d+)"
method = "GET"
action = "item"

[[rules]]
url = "/upload"
method = "POST"
headers = { "x-batch" = "*" }
action = "upload"
"#,
    );
    let file = load_rules(&path).expect("loads");
    assert!(file.options.case);
    assert_eq!(action_for(&file, "get", "/items/3").as_deref(), Some("item"));

    let router = file.finalize().expect("builds");
    let req = routecomb::Request::new("POST", "/upload").header("X-Batch", "42");
    let m = router.dispatch(&req).expect("upload matches");
    assert_eq!(m.captures.as_slice(), ["42"]);
}

#[test]
fn test_load_json_rules() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "routes.json",
        r#"{"rules": [{"url": "/a/**", "action": "glob"}, {"url": "/a/b", "action": "b"}]}"#,
    );
    let file = load_rules(&path).expect("loads");
    assert!(!file.options.trim);
    assert_eq!(action_for(&file, "GET", "/a/b").as_deref(), Some("b"));
    assert_eq!(action_for(&file, "GET", "/a/b/c").as_deref(), Some("glob"));
}

#[test]
fn test_missing_and_malformed_files() {
    let dir = TempDir::new().expect("temp dir");
    let err = load_rules(&dir.path().join("absent.yaml")).expect_err("missing file");
    assert!(err.to_string().contains("Failed to read rule file"));

    let path = write(&dir, "broken.yaml", "rules: [unclosed");
    let err = load_rules(&path).expect_err("malformed yaml");
    assert!(err.to_string().contains("Failed to parse YAML rule file"));

    let path = write(&dir, "no_action.json", r#"{"rules": [{"url": "/"}]}"#);
    assert!(load_rules(&path).is_err());
}

#[test]
fn test_invalid_header_declaration() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "headers.yaml",
        "rules:\n  - url: /\n    headers: [[nested]]\n    action: x\n",
    );
    let file = load_rules(&path).expect("loads");
    assert!(matches!(file.finalize(), Err(Error::InvalidHeader { .. })));
}

#[test]
fn test_case_conflict_in_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "conflict.yaml",
        "options: { case: true }\nrules:\n  - { url: /a, action: x }\n  - { url: /A, action: y }\n",
    );
    let file = load_rules(&path).expect("loads");
    let err = file.finalize().expect_err("conflict");
    assert!(matches!(err, Error::CaseConflict { .. }));
    assert_eq!(err.to_string(), "case conflict `ALL /A` vs `ALL /a`");
}
