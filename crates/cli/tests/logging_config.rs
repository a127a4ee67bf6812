use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_logging_to_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let log_file = root.join("pfx.log");

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
database = "{}/pf.db"

[logging]
level = "debug"
file = "{}"
"#,
        root.display(),
        log_file.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pfx"));
    cmd.arg("--config").arg(&config_path).args(["realm", "create", "zulip"]).assert().success();

    assert!(log_file.exists(), "Log file should be created");
    let log = fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("created realm 'zulip'"));
}

#[test]
fn test_logging_level_parsing() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
database = "{}/pf.db"

[logging]
level = "trace"
"#,
        root.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pfx"));
    cmd.arg("--config").arg(&config_path).arg("doctor").assert().success();
}

#[test]
fn test_logging_split_levels() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let log_file = root.join("split.log");

    let config_path = root.join("config.toml");
    let config_content = format!(
        r#"
version = 1
[profiles.default]
database = "{}/pf.db"

[logging]
level = "error"
file_level = "debug"
file = "{}"
"#,
        root.display(),
        log_file.display()
    );
    fs::write(&config_path, &config_content).unwrap();

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pfx"));
    cmd.arg("--config").arg(&config_path).args(["realm", "create", "zulip"]).assert().success();

    assert!(log_file.exists());
}
