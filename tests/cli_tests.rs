#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{copy_fixture, read_file};
use std::path::Path;
use std::process::{Command, Output};

fn run_gen(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_edgeroute-gen"))
        .args(args)
        .arg("--root")
        .arg(root)
        .env("EDGEROUTE_LOG_LEVEL", "error")
        .output()
        .expect("run edgeroute-gen")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_generate_then_check() {
    let project = copy_fixture("project");

    let check = run_gen(project.path(), &["check"]);
    assert!(!check.status.success(), "check passed before generating");
    assert!(stderr(&check).contains("out of date"));

    let generate = run_gen(project.path(), &["generate"]);
    assert!(generate.status.success(), "stderr: {}", stderr(&generate));
    assert!(stdout(&generate).contains("✅ Generated http dispatch (6 record(s))"));
    assert!(stdout(&generate).contains("✅ Generated queue dispatch (3 record(s))"));

    let check = run_gen(project.path(), &["check"]);
    assert!(check.status.success(), "stderr: {}", stderr(&check));
}

#[test]
fn test_check_detects_source_change() {
    let project = copy_fixture("project");
    assert!(run_gen(project.path(), &["generate"]).status.success());

    let module = project.path().join("src/consumers/audit.consumer.ts");
    let source = std::fs::read_to_string(&module).unwrap();
    std::fs::write(&module, source.replace("audit-log", "audit-events")).unwrap();

    let check = run_gen(project.path(), &["check"]);
    assert!(!check.status.success());
    assert!(stderr(&check).contains("queue.ts"));
}

#[test]
fn test_routes_json() {
    let project = copy_fixture("project");
    let output = run_gen(project.path(), &["routes", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let routes = report["http"].as_array().unwrap();
    assert_eq!(routes.len(), 6);
    assert_eq!(routes[0]["method"], "get");
    assert_eq!(routes[0]["path"], "/admin/settings/");
    assert_eq!(routes[5]["path"], "/api/v1/items/:id");
    assert_eq!(routes[5]["controller_name"], "ItemController");

    let tasks = report["queue"].as_array().unwrap();
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[2]["queue_name"], "orders-bulk");
    assert_eq!(tasks[2]["is_batch"], true);
}

#[test]
fn test_only_http_leaves_queue_alone() {
    let project = copy_fixture("project");
    let output = run_gen(project.path(), &["generate", "--only", "http"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.path().join("src/generated/router.ts").exists());
    assert!(!project.path().join("src/generated/queue.ts").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let project = copy_fixture("project");
    let output = run_gen(project.path(), &["generate", "--dry-run", "--only", "queue"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("export async function handleMessage("));
    assert!(!project.path().join("src/generated").exists());
}

#[test]
fn test_conflicts_fail_generation() {
    let project = copy_fixture("conflicts");
    common::write_file(project.path(), "src/generated/router.ts", "// previous\n");

    let output = run_gen(project.path(), &["generate"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("conflict"), "stderr: {err}");
    assert!(err.contains("GET /users/list"), "stderr: {err}");
    assert_eq!(
        read_file(project.path(), "src/generated/router.ts"),
        "// previous\n"
    );
}

#[test]
fn test_lint_fail_on_error() {
    let project = copy_fixture("conflicts");

    let lenient = run_gen(project.path(), &["lint"]);
    assert!(lenient.status.success(), "stderr: {}", stderr(&lenient));
    assert!(stdout(&lenient).contains("duplicate_route"));

    let strict = run_gen(project.path(), &["lint", "--fail-on-error"]);
    assert!(!strict.status.success());
    assert!(stderr(&strict).contains("lint found 1 error(s)"));
}

#[test]
fn test_missing_source_dirs_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_gen(dir.path(), &["generate"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!dir.path().join("src/generated").exists());
}
