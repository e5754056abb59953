use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_mathhammer")
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("mathhammer-{name}-{stamp}.{ext}"))
}

#[test]
fn roll_command_emits_a_json_report() {
    let output = Command::new(bin())
        .args([
            "roll",
            "40k",
            "attacks=10",
            "hit=3",
            "strength=4",
            "toughness=4",
            "save=3",
            "damage=1",
            "wounds_per_model=1",
        ])
        .output()
        .expect("roll should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("roll should emit json");
    assert_eq!(payload["stages"].as_array().map(Vec::len), Some(6));
    assert!(payload["permalink"].as_str().is_some());
}

#[test]
fn roll_command_table_mode_prints_one_row_per_stage() {
    let output = Command::new(bin())
        .args(["roll", "aos", "attacks=6", "hit=3", "wound=4", "--table"])
        .output()
        .expect("roll should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Header plus the six pipeline stages.
    assert_eq!(stdout.lines().count(), 7);
    assert!(stdout.starts_with("stage\texpected\ttitle"));
}

#[test]
fn roll_command_requires_a_ruleset() {
    let output = Command::new(bin())
        .args(["roll", "chess"])
        .output()
        .expect("roll should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: mathhammer roll"));
}

#[test]
fn unknown_command_returns_usage() {
    let output = Command::new(bin())
        .arg("frobnicate")
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: mathhammer"));
}

#[test]
fn export_command_writes_csv() {
    let path = unique_temp_path("export", "csv");
    let output = Command::new(bin())
        .args([
            "export",
            "40k",
            path.to_string_lossy().as_ref(),
            "attacks=2",
            "hit=4",
            "strength=4",
            "toughness=4",
            "damage=1",
            "wounds_per_model=1",
        ])
        .output()
        .expect("export should run");

    assert_eq!(output.status.code(), Some(0));
    let written = fs::read_to_string(&path).expect("csv should exist");
    assert!(written.starts_with("stage,title,outcome,probability,at_least,mortal"));
    assert!(written.contains("models killed"));

    let _ = fs::remove_file(path);
}

#[test]
fn scenario_command_evaluates_a_file() {
    let path = unique_temp_path("scenario", "yaml");
    fs::write(
        &path,
        "ruleset: 40k\ncases:\n  - label: demo\n    attacks: \"5\"\n    hit: 3\n    strength: 4\n    toughness: 4\n    damage: \"1\"\n    wounds_per_model: 1\n",
    )
    .expect("fixture should be written");

    let output = Command::new(bin())
        .args(["scenario", path.to_string_lossy().as_ref()])
        .output()
        .expect("scenario should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value =
        serde_json::from_str(&stdout).expect("scenario should emit json");
    assert_eq!(payload[0]["label"], "demo");
    assert!(payload[0]["expected_casualties"].as_f64().is_some());

    let _ = fs::remove_file(path);
}

#[test]
fn scenario_command_fails_cleanly_on_missing_file() {
    let output = Command::new(bin())
        .args(["scenario", "/nonexistent/file.yaml"])
        .output()
        .expect("scenario should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load scenario"));
}
