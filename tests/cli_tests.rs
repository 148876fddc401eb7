//! CLI integration tests
//!
//! Every command runs against its own data directory and an API URL where
//! nothing listens, so no test depends on a live server.

mod common;

use clinicdesk::core::{Filters, QueryCache, QueryKey, Resource};
use common::{cdesk, cdesk_in, sample_user, DEAD_URL};
use predicates::prelude::*;
use tempfile::tempdir;

/// Write a stored session the way a successful login leaves it
fn write_session(home: &tempfile::TempDir) {
    let user = serde_json::to_string(&sample_user()).unwrap();
    let session = serde_json::json!({"auth_token": "stored-token", "auth_user": user});
    std::fs::write(
        home.path().join("session.json"),
        serde_json::to_string_pretty(&session).unwrap(),
    )
    .unwrap();
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_help_lists_command_groups() {
    cdesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clinic Desk"))
        .stdout(predicate::str::contains("appointment"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_version() {
    cdesk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_command_fails() {
    cdesk()
        .arg("discharge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_completions_bash() {
    cdesk()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cdesk"));
}

// ============================================================================
// Guard
// ============================================================================

#[test]
fn test_protected_command_requires_session() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .args(["clinic", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/healthcare/clinics"))
        .stderr(predicate::str::contains("/login"));
}

#[test]
fn test_dashboard_requires_session() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .arg("dashboard")
        .assert()
        .failure()
        .stderr(predicate::str::contains("/dashboard"));
}

#[test]
fn test_login_refused_while_signed_in() {
    let home = tempdir().unwrap();
    write_session(&home);
    cdesk_in(&home)
        .args(["login", "--email", "dana@clinic.test", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already signed in"));
}

#[test]
fn test_login_without_server_reports_network_error() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .args(["login", "--email", "dana@clinic.test", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network error"));
    assert!(!home.path().join("session.json").exists());
}

#[test]
fn test_whoami_without_session() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not signed in"));
}

// ============================================================================
// Logout
// ============================================================================

#[test]
fn test_logout_clears_session_without_server() {
    let home = tempdir().unwrap();
    write_session(&home);
    cdesk_in(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"))
        .stderr(predicate::str::contains("local session cleared"));
    assert!(!home.path().join("session.json").exists());
}

#[test]
fn test_logout_quiet() {
    let home = tempdir().unwrap();
    write_session(&home);
    cdesk_in(&home)
        .args(["logout", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_url_then_show() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .env_remove("CDESK_API_URL")
        .args(["config", "set-url", "https://clinic.example.org/api/"])
        .assert()
        .success();
    assert!(home.path().join("config.yaml").exists());

    cdesk_in(&home)
        .env_remove("CDESK_API_URL")
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://clinic.example.org/api"));
}

#[test]
fn test_config_set_url_drops_other_servers_cache() {
    let home = tempdir().unwrap();
    let cache_path = home.path().join("cache.db");
    let key = QueryKey::list(Resource::Clinic, 1, 15, &Filters::new());
    {
        let mut cache = QueryCache::open_for(&cache_path, DEAD_URL).unwrap();
        cache.set(&key, &serde_json::json!([])).unwrap();
    }

    cdesk_in(&home)
        .args(["config", "set-url", "https://other.example.org/api"])
        .assert()
        .success();

    let cache = QueryCache::open(&cache_path).unwrap();
    assert!(cache.get(&key).unwrap().is_none());
    assert_eq!(
        cache.origin().unwrap().as_deref(),
        Some("https://other.example.org/api")
    );
}

#[test]
fn test_config_rejects_bad_url() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .args(["config", "set-url", "not a url"])
        .assert()
        .failure();
    assert!(!home.path().join("config.yaml").exists());
}

#[test]
fn test_config_rejects_zero_page_size() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .args(["config", "set-per-page", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_config_path_is_data_dir() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(home.path().to_string_lossy().as_ref()));
}

#[test]
fn test_environment_url_overrides_config() {
    let home = tempdir().unwrap();
    cdesk_in(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:9"));
}
