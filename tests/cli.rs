//! End-to-end tests for the `ticky` binary.
//!
//! Every command runs with `TICKY_CONFIG_DIR` pointing at a temporary directory
//! and its working directory set there too, so no real credentials are read.

mod common;

use common::{StubResponse, StubServer};
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn ticky_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("ticky"));
    cmd.current_dir(dir)
        .env("TICKY_CONFIG_DIR", dir)
        .env_remove("TICKTICK_ACCESS_TOKEN")
        .env_remove("TICKTICK_CLIENT_ID")
        .env_remove("TICKTICK_CLIENT_SECRET");
    cmd
}

/// Run against a stub API; the binary is driven from a blocking thread so the
/// stub keeps serving on the test runtime.
async fn run_against(server: &StubServer, dir: &TempDir, args: &[&str]) -> std::process::Output {
    std::fs::write(
        dir.path().join("ticky.toml"),
        format!("[api]\nbase_url = \"{}\"\n", server.url()),
    )
    .unwrap();

    let mut cmd = ticky_cmd(dir.path());
    cmd.env("TICKTICK_ACCESS_TOKEN", "cli-token").args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap()
}

// =============================================================================
// Offline behavior
// =============================================================================

#[test]
fn test_json_and_plain_are_exclusive() {
    let dir = TempDir::new().unwrap();
    ticky_cmd(dir.path())
        .args(["--json", "--plain", "projects", "list"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_priority_rejected_before_auth() {
    let dir = TempDir::new().unwrap();
    ticky_cmd(dir.path())
        .args(["tasks", "create", "--title", "x", "--priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: invalid priority: urgent"));
}

#[test]
fn test_invalid_due_date_rejected() {
    let dir = TempDir::new().unwrap();
    ticky_cmd(dir.path())
        .args(["tasks", "create", "--title", "x", "--due", "next week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported date format: next week"));
}

#[test]
fn test_status_without_token() {
    let dir = TempDir::new().unwrap();
    ticky_cmd(dir.path())
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not authenticated"));

    ticky_cmd(dir.path())
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"not authenticated\""));
}

#[test]
fn test_commands_require_login() {
    let dir = TempDir::new().unwrap();
    ticky_cmd(dir.path())
        .args(["projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ticky auth login"));
}

#[test]
fn test_login_requires_client_credentials() {
    let dir = TempDir::new().unwrap();
    ticky_cmd(dir.path())
        .args(["auth", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TICKTICK_CLIENT_ID and TICKTICK_CLIENT_SECRET must be set"));
}

#[test]
fn test_logout_removes_files_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("token.json"), r#"{"access_token":"a"}"#).unwrap();
    std::fs::write(dir.path().join("config.json"), r#"{"inbox_id":"i"}"#).unwrap();

    ticky_cmd(dir.path())
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out successfully"));
    assert!(!dir.path().join("token.json").exists());
    assert!(!dir.path().join("config.json").exists());

    ticky_cmd(dir.path()).args(["auth", "logout"]).assert().success();
}

#[test]
fn test_config_path_and_init() {
    let dir = TempDir::new().unwrap();
    ticky_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(dir.path().to_string_lossy().to_string()));

    ticky_cmd(dir.path()).args(["config", "init"]).assert().success();
    assert!(dir.path().join("config.toml").is_file());

    ticky_cmd(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    ticky_cmd(dir.path()).args(["config", "init", "--force"]).assert().success();
}

// =============================================================================
// Against a stub API
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_projects_list_plain() {
    let server = StubServer::start(|_| {
        StubResponse::json(200, json!([{"id": "p1", "name": "Work"}, {"id": "p2", "name": "Home"}]))
    })
    .await;
    let dir = TempDir::new().unwrap();

    let output = run_against(&server, &dir, &["projects", "list", "--plain"]).await;
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "p1\tWork\np2\tHome\n");
    assert_eq!(server.requests()[0].header("authorization"), Some("Bearer cli-token"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tasks_create_json() {
    let server = StubServer::start(|req| {
        StubResponse::json(
            200,
            json!({"id": "t9", "projectId": "p1", "title": req.json()["title"], "priority": 5}),
        )
    })
    .await;
    let dir = TempDir::new().unwrap();

    let output = run_against(
        &server,
        &dir,
        &["--json", "tasks", "create", "--title", "Ship it", "--project", "p1", "--priority", "high", "--tags", "a,b"],
    )
    .await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["id"], "t9");
    assert_eq!(printed["title"], "Ship it");
    assert_eq!(
        server.requests()[0].json(),
        json!({"title": "Ship it", "projectId": "p1", "priority": 5, "tags": ["a", "b"]})
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tasks_update_clears_due_date() {
    let server = StubServer::start(|req| match req.method.as_str() {
        "GET" => StubResponse::json(
            200,
            json!({"id": "t1", "projectId": "p1", "title": "Old", "dueDate": "2024-01-01T23:59:59.000+0000", "tags": ["x"]}),
        ),
        _ => StubResponse::json(200, json!({"id": "t1", "projectId": "p1", "title": "Old"})),
    })
    .await;
    let dir = TempDir::new().unwrap();

    let output = run_against(
        &server,
        &dir,
        &["tasks", "update", "t1", "--project", "p1", "--clear-due", "--add-tags", "y"],
    )
    .await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Updated task: Old (ID: t1)"));

    let requests = server.requests();
    assert_eq!(requests[0].path, "/project/p1/task/t1");
    assert_eq!(requests[1].path, "/task/t1");
    let body = requests[1].json();
    assert_eq!(body["dueDate"], "");
    assert_eq!(body["tags"], json!(["x", "y"]));
    assert_eq!(body["title"], "Old");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tags_list_uses_cached_inbox() {
    let server = StubServer::start(|req| match req.path.as_str() {
        "/project" => StubResponse::json(200, json!([{"id": "p1", "name": "Work"}])),
        "/project/inbox1/data" => StubResponse::json(
            200,
            json!({"tasks": [{"id": "a", "tags": ["home"]}, {"id": "b", "tags": ["work", "home"]}]}),
        ),
        "/project/p1/data" => StubResponse::text(500, "boom"),
        _ => StubResponse::text(404, "not found"),
    })
    .await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), r#"{"inbox_id":"inbox1"}"#).unwrap();

    let output = run_against(&server, &dir, &["tags", "list", "--plain"]).await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "home\t2\nwork\t1\n");
    assert!(server.requests().iter().all(|r| r.method == "GET"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_complete_reports_status() {
    let server = StubServer::start(|_| StubResponse::empty()).await;
    let dir = TempDir::new().unwrap();

    let output = run_against(&server, &dir, &["--plain", "tasks", "complete", "t1", "--project", "p1"]).await;
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "t1\tcompleted\n");
    assert_eq!(server.requests()[0].path, "/project/p1/task/t1/complete");
}
