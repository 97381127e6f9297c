use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const LOG: &str = "\
Starting to evaluate predicate P/2.
3 ~50% {2} r1 = foo(x,y)
>>> Relation P: 3 rows
";

fn ra_prof() -> Command {
    Command::cargo_bin("ra-prof").unwrap()
}

#[test]
fn test_missing_input_exits_with_message() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.log");

    ra_prof()
        .arg("trace")
        .arg(&missing)
        .arg("-o")
        .arg(temp_dir.path().join("out.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found:"));
}

#[test]
fn test_database_without_logs_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::create_dir(temp_dir.path().join("log")).unwrap();

    ra_prof()
        .arg("flamegraph")
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No logs in snapshot:"));
}

#[test]
fn test_trace_command_writes_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log = temp_dir.path().join("run.log");
    let output = temp_dir.path().join("trace.json");
    fs::write(&log, LOG).unwrap();

    ra_prof()
        .arg("trace")
        .arg(&log)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let trace: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(trace["traceEvents"][2]["args"]["tc"], serde_json::json!([3]));
}

#[test]
fn test_flamegraph_html_with_relative_data() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log = temp_dir.path().join("run.log");
    let output = temp_dir.path().join("fg.html");
    fs::write(&log, LOG).unwrap();

    ra_prof()
        .args(["flamegraph", "--relative", "-o"])
        .arg(&output)
        .arg(&log)
        .assert()
        .success();

    let page = fs::read_to_string(&output).unwrap();
    assert!(page.contains(r#"<script src="fg.html.data.js"></script>"#));
    assert!(temp_dir.path().join("fg.html.data.js").exists());
}

#[test]
fn test_flamegraph_trace_format() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log = temp_dir.path().join("run.log");
    let output = temp_dir.path().join("fg.json");
    fs::write(&log, LOG).unwrap();

    ra_prof()
        .args(["flamegraph", "--format", "trace", "--streaming", "-o"])
        .arg(&output)
        .arg(&log)
        .assert()
        .success();

    let trace: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(trace["traceEvents"].as_array().map(|a| a.len()), Some(4));
}
