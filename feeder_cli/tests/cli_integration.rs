//! End-to-end checks of the binary against the simulated rig.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn feeder_cmd() -> Command {
    Command::cargo_bin("feeder").expect("binary builds")
}

#[test]
fn help_shows_usage() {
    feeder_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Automatic feeder controller"));
}

#[test]
fn runs_for_a_fixed_duration() {
    feeder_cmd()
        .args(["--duration-ms", "400"])
        .assert()
        .success();
}

#[test]
fn quit_command_exits_cleanly() {
    feeder_cmd()
        .write_stdin("status\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cooldown"));
}

#[test]
fn json_mode_emits_field_records() {
    let assert = feeder_cmd()
        .args(["--json", "--duration-ms", "1500"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let mut saw_rate = false;
    for line in stdout.lines() {
        let record: serde_json::Value = serde_json::from_str(line).expect("JSONL record");
        assert!(record.get("field").is_some());
        assert!(record.get("value").is_some());
        if record["field"] == "grams_per_day" {
            assert_eq!(record["value"], 60);
            saw_rate = true;
        }
    }
    assert!(saw_rate, "expected a grams_per_day record, got: {stdout}");
}

#[test]
fn invalid_config_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[feeding]\ngrams_per_day = 500").unwrap();

    feeder_cmd()
        .args(["--config", file.path().to_str().unwrap()])
        .args(["--duration-ms", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("grams_per_day"));
}

#[test]
fn config_overrides_the_daily_ration() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[feeding]\ngrams_per_day = 45").unwrap();

    let assert = feeder_cmd()
        .args(["--config", file.path().to_str().unwrap()])
        .args(["--json", "--duration-ms", "1500"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(
        stdout.lines().any(|l| {
            serde_json::from_str::<serde_json::Value>(l)
                .is_ok_and(|r| r["field"] == "grams_per_day" && r["value"] == 45)
        }),
        "expected grams_per_day=45, got: {stdout}"
    );
}
