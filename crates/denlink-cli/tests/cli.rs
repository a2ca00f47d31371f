//! CLI integration smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn denlink() -> Command {
    Command::cargo_bin("denlink").unwrap()
}

#[test]
fn help_lists_all_modes() {
    denlink()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("diagnose"))
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn export_rejects_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    denlink()
        .current_dir(dir.path())
        .args(["config", "init", "-o"])
        .arg(&config)
        .assert()
        .success();

    denlink()
        .current_dir(dir.path())
        .arg("-c")
        .arg(&config)
        .args(["export", "missing.pdf"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn export_rejects_explicit_config_that_does_not_exist() {
    let dir = tempfile::tempdir().unwrap();
    denlink()
        .current_dir(dir.path())
        .args(["-c", "no-such-config.json", "export", "whatever.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn config_path_prints_a_location() {
    denlink()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}

#[test]
fn config_init_writes_defaults_and_respects_force() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    denlink()
        .args(["config", "init", "-o"])
        .arg(&config)
        .assert()
        .success();
    let content = std::fs::read_to_string(&config).unwrap();
    assert!(content.contains("endpoint_url"));
    assert!(content.contains("cycle_rows"));

    // Refuses to clobber without --force.
    denlink()
        .args(["config", "init", "-o"])
        .arg(&config)
        .assert()
        .failure();

    denlink()
        .args(["config", "init", "--force", "-o"])
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn config_show_renders_defaults_without_a_file() {
    let dir = tempfile::tempdir().unwrap();
    denlink()
        .args(["-c"])
        .arg(dir.path().join("absent.json"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("endpoint_url"));
}
