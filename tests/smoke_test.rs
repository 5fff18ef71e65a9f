//! Smoke tests for the devshelf CLI.
//!
//! These tests need no running server:
//! - `devshelf --version` and `--help`
//! - configuration errors are reported as JSON (or `Error:` with `-H`)
//! - client commands fail cleanly when the server is unreachable

mod common;

use common::{TestEnv, free_port};
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    TestEnv::new()
        .devshelf()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("devshelf"))
        .stdout(predicate::str::contains("0.1.0"))
        .stdout(predicate::str::contains("built"));
}

#[test]
fn test_help_flag() {
    TestEnv::new()
        .devshelf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn test_serve_without_database_url_fails() {
    TestEnv::new()
        .devshelf()
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\""))
        .stderr(predicate::str::contains("DEVSHELF_DATABASE_URL"));
}

#[test]
fn test_serve_without_database_url_fails_human() {
    TestEnv::new()
        .devshelf()
        .args(["-H", "serve"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_malformed_config_file_is_reported() {
    let env = TestEnv::new();
    std::fs::write(env.config_path(), "port = \"many\"").unwrap();

    env.devshelf()
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unknown_entity_is_usage_error() {
    TestEnv::new()
        .devshelf()
        .args(["list", "bookmarks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown entity"));
}

#[test]
fn test_unreachable_server_is_error() {
    let port = free_port();
    TestEnv::new()
        .devshelf()
        .args(["--server", &format!("http://127.0.0.1:{}", port), "list", "notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP error"));
}

#[test]
fn test_blank_project_urls_rejected_without_server() {
    let port = free_port();
    TestEnv::new()
        .devshelf()
        .args(["--server", &format!("http://127.0.0.1:{}", port)])
        .args(["add", "project", "site", " ", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Name and at least one URL are required",
        ));
}
