//! CLI integration tests for the printssistant command-line interface.
//!
//! None of these start the server; `status` runs with `--offline`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A printssistant command with a clean environment rooted in `dir`.
fn printssistant(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("printssistant").unwrap();
    cmd.env_clear()
        .current_dir(dir.path())
        .env("TOKENS_PATH", dir.path().join("tokens.json"));
    cmd
}

const TOKENS: &str = r#"{
  "access_token": "abcdefghijklmnopqrstuvwxyz",
  "refresh_token": "refresh-abcdefghijkl",
  "expires_at": 4102444800000
}"#;

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    printssistant(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("logout"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    printssistant(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("printssistant"));
}

#[test]
fn test_start_rejects_unknown_tier() {
    let dir = TempDir::new().unwrap();
    printssistant(&dir)
        .args(["start", "--tier", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_start_rejects_invalid_port_env() {
    let dir = TempDir::new().unwrap();
    printssistant(&dir)
        .env("PORT", "not-a-port")
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_status_without_tokens() {
    let dir = TempDir::new().unwrap();
    let output = printssistant(&dir)
        .args(["status", "--offline", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["authenticated"], false);
    assert!(status["access_token"].is_null());
    assert!(status["running"].is_null());
    assert_eq!(status["tokens_writable"], true);
}

#[test]
fn test_status_with_tokens_shows_preview_only() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tokens.json"), TOKENS).unwrap();

    let output = printssistant(&dir)
        .args(["status", "--offline", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("mnopqrstuvwxyz"));

    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["access_token"], "abcdefghijkl…");
    assert_eq!(status["has_refresh_token"], true);
    assert_eq!(status["expired"], false);
}

#[test]
fn test_status_on_vercel_is_read_only() {
    let dir = TempDir::new().unwrap();
    let output = printssistant(&dir)
        .env("VERCEL", "1")
        .args(["status", "--offline", "--json"])
        .output()
        .unwrap();

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["tokens_writable"], false);
}

// ─────────────────────────────────────────────────────────────────────────────
// Logout
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_logout_removes_token_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tokens.json");
    std::fs::write(&path, TOKENS).unwrap();

    printssistant(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tokens removed"));

    assert!(!path.exists());
}

#[test]
fn test_logout_without_tokens() {
    let dir = TempDir::new().unwrap();
    printssistant(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tokens were stored"));
}

#[test]
fn test_logout_refuses_read_only_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tokens.json");
    std::fs::write(&path, TOKENS).unwrap();

    printssistant(&dir)
        .env("TOKENS_READ_ONLY", "true")
        .arg("logout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));

    assert!(path.exists());
}
