use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("shelf")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("books"))
        .stdout(predicate::str::contains("reviews"))
        .stdout(predicate::str::contains("notifications"));
}

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("shelf")
        .env("SHELF_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    cargo_bin_cmd!("shelf")
        .env("SHELF_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("api_url ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("shelf")
        .env("SHELF_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_set_api_url_rejects_malformed_url() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("shelf")
        .env("SHELF_HOME", dir.path())
        .args(["config", "set-api-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API URL"));
}

#[test]
fn test_whoami_without_session() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("shelf")
        .env("SHELF_HOME", dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[test]
fn test_write_commands_require_login() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("shelf")
        .env("SHELF_HOME", dir.path())
        .args(["books", "create", "--title", "Dune"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}
