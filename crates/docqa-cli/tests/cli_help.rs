use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("docqa")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_sessions_help_shows_subcommands() {
    cargo_bin_cmd!("docqa")
        .args(["sessions", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("select"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_login_requires_sub_and_email() {
    cargo_bin_cmd!("docqa")
        .args(["login", "--sub", "g-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("docqa")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}
