#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(json.as_bytes()).expect("write temp config");
    file
}

fn default_config() -> NamedTempFile {
    write_config(r#"{"reference_month": "2026-10-01"}"#)
}

#[allow(deprecated)]
fn run_cli(config: &NamedTempFile, script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("CHORE_WHEEL_CONFIG", config.path())
        .env_remove("CHORE_WHEEL_ADVISOR_URL")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_shows_the_current_month_on_start() {
    let config = default_config();
    run_cli(&config, "quit\n")
        .success()
        .stdout(str_contains("Month 0: October 2026"))
        .stdout(str_contains("week 1: Oct 6"))
        .stdout(str_contains("Clean Kitchen"));
}

#[test]
fn cli_reports_empty_schedules() {
    let config = write_config(r#"{"roster": [], "chores": {}}"#);
    run_cli(&config, "show\nquit\n")
        .success()
        .stdout(str_contains("Nothing to schedule."));
}

#[test]
fn cli_member_commands() {
    let config = default_config();
    run_cli(
        &config,
        "add-member\nadd-member Alex\nadd-member Alex\nrename Person 1 -> Ada\nremove-member Ghost\nroster\nquit\n",
    )
    .success()
    .stdout(str_contains("Added member Person 5."))
    .stdout(str_contains("Added member Alex."))
    .stdout(str_contains("Error: member 'Alex' is already on the roster"))
    .stdout(str_contains("Renamed Person 1 to Ada (0 frozen tasks updated)."))
    .stdout(str_contains("Error: member 'Ghost' is not on the roster"))
    .stdout(str_contains("Ada"));
}

#[test]
fn cli_rename_updates_frozen_months() {
    let config = default_config();
    run_cli(&config, "freeze\nrename Person 2 Bea\nquit\n")
        .success()
        .stdout(str_contains("Month 0 frozen."))
        .stdout(str_contains("Renamed Person 2 to Bea (4 frozen tasks updated)."));
}

#[test]
fn cli_chore_commands() {
    let config = default_config();
    run_cli(
        &config,
        "add-chore\nchore new-chore-5 title Water Plants\nchore new-chore-5 freq 0\nchore new-chore-5 color red\nremove-chore missing\nquit\n",
    )
    .success()
    .stdout(str_contains("Chore new-chore-5 added."))
    .stdout(str_contains("Chore new-chore-5 updated: Water Plants (freq=1)."))
    .stdout(str_contains("Unknown chore field 'color'."))
    .stdout(str_contains("Error: chore 'missing' not found"));
}

#[test]
fn cli_navigation_and_freezing() {
    let config = default_config();
    run_cli(&config, "prev\nnext\nfreeze\nunfreeze\nunfreeze\nmonth 3\nquit\n")
        .success()
        .stdout(str_contains("Error: cannot go before the reference month"))
        .stdout(str_contains("Month 1: November 2026"))
        .stdout(str_contains("Month 1 frozen."))
        .stdout(str_contains("Month 1 unfrozen."))
        .stdout(str_contains("Month 1 is not frozen."))
        .stdout(str_contains("Month 3: January 2027"));
}

#[test]
fn cli_suggests_the_least_loaded_member() {
    let config = default_config();
    run_cli(&config, "suggest clean-bathroom\nsuggest nope\nquit\n")
        .success()
        .stdout(str_contains("Suggested: Person 2"))
        .stdout(str_contains("Reasoning: Person 2 has completed 4 task(s)"))
        .stdout(str_contains("Error: chore 'nope' not found"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let config = default_config();
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "add-member Persisted\nsave json {}\nadd-member Temp\nload json {}\nroster\nquit\n",
        path, path
    );
    let assert = run_cli(&config, &script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Board loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Board loaded from")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("Persisted"),
        "persisted member should remain"
    );
    assert!(
        !after_reload.contains("Temp"),
        "temporary member should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_records_completions() {
    let config = default_config();
    run_cli(&config, "done Person 1\nstats\nquit\n")
        .success()
        .stdout(str_contains("Person 1 has completed 6 tasks."))
        .stdout(str_contains("No frozen months."));
}

#[test]
fn cli_rejects_unknown_commands() {
    let config = default_config();
    run_cli(&config, "dance\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}

#[test]
fn cli_exits_on_bad_config() {
    let config = write_config("{not json");
    run_cli(&config, "quit\n").failure();
}

#[test]
fn cli_reports_months_past_the_last_offset() {
    let config = default_config();
    run_cli(&config, "month 9223372036854775807\nnext\nquit\n")
        .success()
        .stdout(str_contains("Error: month 9223372036854775807 is out of range"));
}

#[test]
fn cli_completion_counts_do_not_overflow() {
    let config = write_config(
        r#"{"reference_month": "2026-10-01", "completions": {"Person 1": 4294967295}}"#,
    );
    run_cli(&config, "done Person 1\nquit\n")
        .success()
        .stdout(str_contains("Person 1 has completed 4294967295 tasks."));
}
