use chrono::{NaiveDate, NaiveTime, Weekday};
use climbing_plan::{
    Category, ConfigurationError, OutputPaths, PlanConfig, WeekEntry, load_config_from_json,
    save_config_to_json,
};
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;

const SMALL_PLAN: &str = r#"{
    "anchor_date": "2025-05-05",
    "first_week": 19,
    "last_week": 20,
    "deload_weeks": [20],
    "sessions": [
        {
            "code": "F",
            "display_name": "Glutes + Core",
            "category": "conditioning",
            "weekdays": ["Wed", "Sat"],
            "start_time": "18:00",
            "duration_minutes": 30
        }
    ],
    "weeks": [
        { "week": 19, "sessions": "F, F" },
        { "week": 20, "sessions": ["F"] }
    ]
}"#;

fn write_temp(text: &str) -> NamedTempFile {
    let tmp = NamedTempFile::new().unwrap();
    fs::write(tmp.path(), text).unwrap();
    tmp
}

#[test]
fn default_config_round_trips_through_json() {
    let tmp = NamedTempFile::new().unwrap();
    let config = PlanConfig::default();
    save_config_to_json(&config, tmp.path()).unwrap();
    let loaded = load_config_from_json(tmp.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn loads_hand_written_plan_with_defaults() {
    let tmp = write_temp(SMALL_PLAN);
    let config = load_config_from_json(tmp.path()).unwrap();

    assert_eq!(config.anchor_date, NaiveDate::from_ymd_opt(2025, 5, 5).unwrap());
    assert_eq!(config.time_zone, "Europe/Paris");
    assert!(config.send_weeks.is_empty());
    assert!(!config.skip_unknown_sessions);

    let def = &config.sessions[0];
    assert_eq!(def.category, Category::Conditioning);
    assert_eq!(def.weekdays, vec![Weekday::Wed, Weekday::Sat]);
    assert_eq!(def.start_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    assert!(!def.emphasized);

    assert_eq!(config.weeks[0], WeekEntry::new(19, "F, F"));
    assert_eq!(config.weeks[1].sessions, vec!["F"]);
}

#[test]
fn loaded_plan_builds_catalog_and_plan() {
    let tmp = write_temp(SMALL_PLAN);
    let config = load_config_from_json(tmp.path()).unwrap();
    let catalog = config.catalog().unwrap();
    let plan = config.plan().unwrap();
    assert!(catalog.contains("F"));
    assert_eq!(plan.weeks_in_order(), vec![19, 20]);
    assert_eq!(plan.sessions_for(19).len(), 2);
}

#[test]
fn duplicate_week_entries_are_rejected() {
    let mut config = PlanConfig::default();
    config.weeks.push(WeekEntry::new(19, "F"));
    assert!(matches!(config.plan(), Err(ConfigurationError::PlanRange(_))));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let tmp = write_temp("{ \"anchor_date\": ");
    let err = load_config_from_json(tmp.path()).unwrap_err();
    assert!(matches!(err, ConfigurationError::Parse { .. }));
}

#[test]
fn bad_start_time_is_a_parse_error() {
    let tmp = write_temp(&SMALL_PLAN.replace("18:00", "6pm"));
    assert!(matches!(
        load_config_from_json(tmp.path()),
        Err(ConfigurationError::Parse { .. })
    ));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load_config_from_json("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ConfigurationError::Read { .. }));
    assert!(err.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn output_paths_use_fixed_names() {
    let outputs = OutputPaths::in_dir("out");
    assert_eq!(outputs.calendar, Path::new("out/climbing_plan.ics"));
    assert_eq!(outputs.spreadsheet, Path::new("out/climbing_training_plan.xlsx"));
    assert_eq!(outputs.chart, Path::new("out/training_load_chart.png"));
    assert_eq!(outputs.summary, Path::new("out/training_load.csv"));
}
