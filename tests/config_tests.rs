use chrono::{NaiveDate, Weekday};
use chore_wheel::{
    BoardConfig, ChoreBoard, ConfigError, FrequencyMode, OrphanPolicy, OverflowPolicy,
};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn missing_fields_fall_back_to_seed_data() {
    let config = BoardConfig::from_json("{}").unwrap();
    assert_eq!(config, BoardConfig::default());
    assert_eq!(config.roster.len(), 4);
    assert_eq!(config.rotation_day, Weekday::Tue);
    assert_eq!(config.options.frequency_mode, FrequencyMode::PerWeek);
    assert_eq!(config.options.overflow, OverflowPolicy::Drop);
}

#[test]
fn full_config_is_read() {
    let json = r#"{
        "roster": ["Alice", "Bob", " ", "Alice"],
        "chores": {
            "wash": {"id": "wash", "title": "Wash up", "frequency": 0, "iconName": "Droplet"},
            "trash": {"id": "trash", "title": "Trash"}
        },
        "options": {"frequency_mode": "per_month", "overflow": "carry_forward"},
        "reference_month": "2026-10-15",
        "rotation_day": "Fri",
        "skip_dates": ["2026-10-23"],
        "orphan_policy": "reassign",
        "completions": {"Alice": 2}
    }"#;
    let config = BoardConfig::from_json(json).unwrap();

    assert_eq!(config.roster.as_slice(), ["Alice", "Bob"]);
    let wash = config.chores.get("wash").unwrap();
    assert_eq!(wash.frequency(), 1);
    assert_eq!(wash.icon_name, "Droplet");
    assert_eq!(config.chores.get("trash").unwrap().frequency(), 1);
    assert_eq!(config.options.frequency_mode, FrequencyMode::PerMonth);
    assert_eq!(config.options.overflow, OverflowPolicy::CarryForward);
    assert_eq!(config.orphan_policy, OrphanPolicy::Reassign);
    assert_eq!(config.rotation_day, Weekday::Fri);

    let calendar = config.calendar();
    assert_eq!(
        calendar.reference_month(),
        NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
    );
    // Fridays in October 2026: 2, 9, 16, 23 (skipped to 24)
    assert_eq!(
        calendar.week_dates(0)[3],
        NaiveDate::from_ymd_opt(2026, 10, 24).unwrap()
    );

    let board = ChoreBoard::new(config);
    assert_eq!(board.completion_counts()["Alice"], 2);
}

#[test]
fn mismatched_chore_key_is_rejected() {
    let json = r#"{"chores": {"wash": {"id": "dishes", "title": "Dishes"}}}"#;
    match BoardConfig::from_json(json) {
        Err(ConfigError::Invalid(err)) => assert!(err.to_string().contains("dishes")),
        other => panic!("expected invalid config, got {other:?}"),
    }
}

#[test]
fn blank_title_is_rejected() {
    let json = r#"{"chores": {"wash": {"id": "wash", "title": "  "}}}"#;
    assert!(matches!(
        BoardConfig::from_json(json),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        BoardConfig::from_json("{not json"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn load_reads_a_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"roster": ["Solo"], "chores": {{}}}}"#).unwrap();
    let config = BoardConfig::load(file.path()).unwrap();
    assert_eq!(config.roster.as_slice(), ["Solo"]);
    assert!(config.chores.is_empty());
}

#[test]
fn load_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(
        BoardConfig::load(&missing),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn board_config_round_trips_through_json() {
    let mut board = ChoreBoard::new(BoardConfig::default());
    board.add_member(Some("Extra")).unwrap();
    let json = serde_json::to_string(&board.config()).unwrap();
    let restored = BoardConfig::from_json(&json).unwrap();
    assert_eq!(restored, board.config());
}
