use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn bctheme(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bctheme").unwrap();
    cmd.env("BC_ROOT", root)
        .env("BC_CONFIG", root.join("config.toml"))
        .env_remove("RUST_LOG")
        .env_remove("BC_ROBOT")
        .current_dir(root);
    cmd
}

fn write_theme(root: &Path, name: &str) {
    let dir = root.join("themes").join(name);
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(
        dir.join("theme.toml"),
        format!("[theme]\ntitle = \"{name} title\"\nversion = \"1.0.0\"\n"),
    )
    .unwrap();
    std::fs::write(
        dir.join("src/Plugin.php"),
        format!("<?php\nnamespace {name};\n\nclass Plugin {{}}\n"),
    )
    .unwrap();
}

fn robot_json(cmd: &mut Command) -> Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("bctheme").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("bctheme").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_creates_root() {
    let dir = tempdir().unwrap();
    let json = robot_json(bctheme(dir.path()).args(["--robot", "init"]));

    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["site_created"], Value::Bool(true));
    assert!(dir.path().join("config.toml").is_file());
    assert!(dir.path().join("themes").is_dir());
    assert!(dir.path().join("bctheme.db").is_file());
}

#[test]
fn test_copy_then_list() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();
    write_theme(dir.path(), "BcFront");

    bctheme(dir.path())
        .args(["copy", "BcFront"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BcFrontCopy"));

    let descriptor =
        std::fs::read_to_string(dir.path().join("themes/BcFrontCopy/src/Plugin.php")).unwrap();
    assert!(descriptor.contains("namespace BcFrontCopy;"));

    let json = robot_json(bctheme(dir.path()).args(["--robot", "list"]));
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["BcFront", "BcFrontCopy"]);
}

#[test]
fn test_second_copy_fails() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();
    write_theme(dir.path(), "BcFront");

    bctheme(dir.path()).args(["copy", "BcFront"]).assert().success();
    bctheme(dir.path())
        .args(["--robot", "copy", "BcFront"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("already_exists"));
}

#[test]
fn test_apply_updates_site() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();
    write_theme(dir.path(), "BcColumn");

    let json = robot_json(bctheme(dir.path()).args(["--robot", "apply", "BcColumn"]));
    assert_eq!(json["data"]["site"]["theme"], "BcColumn");
    assert_eq!(json["data"]["messages"], Value::Array(Vec::new()));

    let json = robot_json(bctheme(dir.path()).args(["--robot", "sites"]));
    assert_eq!(json["data"][0]["theme"], "BcColumn");
}

#[test]
fn test_apply_missing_theme_fails() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();

    bctheme(dir.path())
        .args(["--robot", "apply", "Nope"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not_found"));
}

#[test]
fn test_robot_env_reports_errors_as_json() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();

    let output = bctheme(dir.path())
        .env("BC_ROBOT", "1")
        .args(["apply", "Nope"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"]["error"]["code"], "not_found");
}

#[test]
fn test_robot_config_reports_errors_as_json() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();
    std::fs::write(dir.path().join("config.toml"), "[robot]\nformat = \"json\"\n").unwrap();

    bctheme(dir.path())
        .args(["apply", "Nope"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not_found"));

    let json = robot_json(bctheme(dir.path()).args(["sites"]));
    assert_eq!(json["status"], "ok");
}

#[test]
fn test_market_reads_local_feed() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();
    let feed = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/market_themes.rss");

    let json = robot_json(bctheme(dir.path()).args([
        "--robot",
        "market",
        "--url",
        feed.to_str().unwrap(),
    ]));
    let first = &json["data"][0];
    assert_eq!(first["title"], "multiverse");
    assert_eq!(first["version"], "1.0.0");
    assert_eq!(first["category"], "テーマ");
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    bctheme(dir.path())
        .env("BC_MARKET_URL", dir.path().join("missing.rss"))
        .args(["--robot", "market"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not_found"));
}

#[test]
fn test_delete_requires_yes() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();
    write_theme(dir.path(), "BcFront");

    bctheme(dir.path())
        .args(["delete", "BcFront"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
    assert!(dir.path().join("themes/BcFront").is_dir());

    bctheme(dir.path())
        .args(["delete", "BcFront", "--yes"])
        .assert()
        .success();
    assert!(!dir.path().join("themes/BcFront").exists());
}

#[test]
fn test_download_writes_zip() {
    let dir = tempdir().unwrap();
    bctheme(dir.path()).args(["init"]).assert().success();
    write_theme(dir.path(), "BcFront");
    let dest = dir.path().join("out/BcFront.zip");

    let json = robot_json(bctheme(dir.path()).args([
        "--robot",
        "download",
        "BcFront",
        "--output",
        dest.to_str().unwrap(),
    ]));

    assert_eq!(json["data"]["files"], 2);
    assert!(dest.is_file());
    assert!(!dir.path().join("tmp/theme/BcFront").exists());
}
