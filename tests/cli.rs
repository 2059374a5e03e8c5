//! End-to-end tests for the culling-log-parser binary.
//!
//! Each test runs the compiled binary on the sample fixture with its
//! diagnostic log redirected to a temp file.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_session.log")
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join("culling-log-parser-cli-tests")
        .join(name)
}

/// Run the binary with a clean environment for the config variables.
fn run(args: &[&str], log_file: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_culling-log-parser"))
        .args(args)
        .arg("--log-file")
        .arg(log_file)
        .env_remove("CULLING_LOG_CONFIG")
        .env_remove("CULLING_IGNORE_BOTS")
        .env("RUST_LOG", "debug")
        .output()
        .expect("Failed to execute binary")
}

#[test]
fn json_output_for_fixture() {
    let log_file = temp_path("json.log");
    let fixture = fixture();
    let output = run(&[fixture.to_str().unwrap(), "--compact"], &log_file);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "compact JSON is a single line");

    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["games"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["summary"]["wins"], serde_json::json!(1));
    assert_eq!(value["players"]["Alice"]["timesMet"], serde_json::json!(2));
    assert_eq!(value["meta"]["version"], serde_json::json!(93315));
}

#[test]
fn summary_output_for_fixture() {
    let log_file = temp_path("summary.log");
    let fixture = fixture();
    let output = run(&[fixture.to_str().unwrap(), "--summary"], &log_file);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Games: 3 (1 won, 1 lost)"), "{}", stdout);
    assert!(stdout.contains("#3 bot"), "{}", stdout);
}

#[test]
fn diagnostic_log_is_written() {
    let log_file = temp_path("diagnostics.log");
    let _ = std::fs::remove_file(&log_file);
    let fixture = fixture();
    let output = run(&[fixture.to_str().unwrap()], &log_file);

    assert!(output.status.success());
    let contents = std::fs::read_to_string(&log_file).expect("log file should exist");
    assert!(contents.contains("session analyzed"), "{}", contents);
    assert!(contents.contains("round finished"), "{}", contents);
}

#[test]
fn config_file_enables_bot_filtering() {
    let config = temp_path("ignore_bots.toml");
    std::fs::create_dir_all(config.parent().unwrap()).unwrap();
    std::fs::write(&config, "ignore_bots = true\n").unwrap();

    let log_file = temp_path("config.log");
    let fixture = fixture();
    let output = run(
        &[
            fixture.to_str().unwrap(),
            "--compact",
            "--config",
            config.to_str().unwrap(),
        ],
        &log_file,
    );

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let players = value["players"].as_object().unwrap();
    assert_eq!(players.len(), 3);
    assert!(players.keys().all(|name| !name.starts_with("<BOT>")));
}

#[test]
fn missing_file_fails() {
    let log_file = temp_path("missing.log");
    let output = run(&["/nonexistent/culling/Victory.log"], &log_file);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FileNotFound"), "{}", stderr);
}
