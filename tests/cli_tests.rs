// tests/cli_tests.rs

mod common;

use assert_cmd::Command;
use common::{PackageFixture, MANIFEST};
use predicates::prelude::*;

fn mplcheck() -> Command {
    let mut command = Command::cargo_bin("mplcheck").unwrap();
    command.env_remove("RUST_LOG");
    command
}

fn broken_format() -> PackageFixture {
    PackageFixture::valid().with("manifest.yaml", &MANIFEST.replace("Format: '1.3'", "Format: '0.9'"))
}

#[test]
fn clean_package_prints_nothing() {
    let fixture = PackageFixture::valid();
    mplcheck()
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn errors_are_listed_and_fail_the_run() {
    let fixture = broken_format();
    mplcheck()
        .arg(fixture.path())
        .args(["--color", "never"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "manifest.yaml:1:9: E030 Not supported format version \"0.9\"",
        ));
}

#[test]
fn warnings_alone_do_not_fail() {
    let fixture = PackageFixture::valid().with("Classes/Extra.yaml", "Name: Extra\nNamespaces: {}\n");
    mplcheck()
        .arg(fixture.path())
        .args(["--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("W020"));
}

#[test]
fn json_output() {
    let fixture = broken_format();
    let output = mplcheck()
        .arg(fixture.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let diagnostics: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let first = &diagnostics[0];
    assert_eq!(first["code"], "E030");
    assert_eq!(first["file"], "manifest.yaml");
    assert_eq!(first["line"], 1);
    assert_eq!(first["column"], 9);
    assert_eq!(first["details"]["kind"], "unsupported_format");
    assert_eq!(first["details"]["format"], "0.9");
}

#[test]
fn ignore_flag_filters_codes() {
    let fixture = broken_format();
    mplcheck()
        .arg(fixture.path())
        .args(["--ignore", "E030"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn select_flag_filters_codes() {
    let fixture = broken_format();
    mplcheck()
        .arg(fixture.path())
        .args(["--select", "W"])
        .assert()
        .success();
}

#[test]
fn config_file_is_applied() {
    let fixture = broken_format();
    let settings = tempfile::tempdir().unwrap();
    let config = settings.path().join("mplcheck.yaml");
    std::fs::write(&config, "ignore: [E03]\n").unwrap();

    mplcheck()
        .arg(fixture.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    // flags win over the file
    mplcheck()
        .arg(fixture.path())
        .arg("--config")
        .arg(&config)
        .args(["--ignore", "W"])
        .assert()
        .code(1);
}

#[test]
fn invalid_config_file() {
    let fixture = PackageFixture::valid();
    let settings = tempfile::tempdir().unwrap();
    let config = settings.path().join("mplcheck.yaml");
    std::fs::write(&config, "ignore: 12: 3\n").unwrap();

    mplcheck()
        .arg(fixture.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn missing_package_is_fatal() {
    mplcheck()
        .arg("/definitely/not/a/package")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn archives_are_accepted() {
    let fixture = broken_format();
    let target = tempfile::tempdir().unwrap();
    mplcheck()
        .arg(fixture.zip_into(&target))
        .args(["--color", "never"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("E030"));
}

#[test]
fn path_is_required() {
    mplcheck().assert().failure();
}
