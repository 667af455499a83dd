use chrono::{NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use climbing_plan::export::{CalendarOptions, CalendarSink};
use climbing_plan::{
    Catalog, Category, Plan, PlanConfig, PlanSpec, Scheduler, SessionDefinition, build_schedule,
    parse_session_list,
};
use std::collections::{BTreeMap, HashSet};
use tempfile::tempdir;

fn sink() -> CalendarSink {
    CalendarSink::new(CalendarOptions {
        generated_at: Utc.with_ymd_and_hms(2025, 4, 1, 8, 30, 0).unwrap(),
        ..CalendarOptions::default()
    })
}

fn event_blocks(text: &str) -> Vec<&str> {
    text.split("BEGIN:VEVENT")
        .skip(1)
        .map(|block| block.split("END:VEVENT").next().unwrap())
        .collect()
}

#[test]
fn renders_one_event_per_instance() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let text = sink().render(&schedule.instances);

    assert!(text.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
    assert!(text.ends_with("END:VCALENDAR\r\n"));
    assert_eq!(event_blocks(&text).len(), schedule.instances.len());
    assert_eq!(text.matches("END:VEVENT").count(), 82);
}

#[test]
fn every_line_ends_with_crlf() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let text = sink().render(&schedule.instances);
    assert!(!text.replace("\r\n", "").contains('\n'));
}

#[test]
fn first_event_carries_local_times_and_metadata() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let text = sink().render(&schedule.instances);
    let first = event_blocks(&text)[0];

    assert!(first.contains("UID:Doublettes-20250506T1800\r\n"));
    assert!(first.contains("DTSTAMP:20250401T083000Z\r\n"));
    assert!(first.contains("DTSTART;TZID=Europe/Paris:20250506T180000\r\n"));
    assert!(first.contains("DTEND;TZID=Europe/Paris:20250506T200000\r\n"));
    assert!(first.contains("SUMMARY:Doublettes\r\n"));
    assert!(first.contains("DESCRIPTION:Week 19 - training\r\n"));
    assert!(first.contains("CATEGORIES:Lead\r\n"));
}

#[test]
fn deload_weeks_are_described() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let text = sink().render(&schedule.instances);
    assert!(text.contains("DESCRIPTION:Week 23 - deload\r\n"));
    assert!(!text.contains("Week 31 -"));
}

#[test]
fn uids_are_unique_even_for_repeated_sessions() {
    let catalog = Catalog::new([SessionDefinition::new(
        "F",
        "Glutes + Core",
        Category::Conditioning,
        [Weekday::Wed],
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        30,
    )])
    .unwrap();
    let plan = Plan::new(PlanSpec {
        first_week: 19,
        last_week: 19,
        sessions: BTreeMap::from([(19, parse_session_list("F, F"))]),
        deload_weeks: Vec::new(),
        send_weeks: Vec::new(),
    })
    .unwrap();
    let anchor = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
    let schedule = Scheduler::new(&catalog, &plan, anchor)
        .unwrap()
        .build()
        .unwrap();

    let text = sink().render(&schedule.instances);
    assert!(text.contains("UID:Glutes+Core-20250507T1800\r\n"));
    assert!(text.contains("UID:Glutes+Core-20250507T1800-2\r\n"));
}

#[test]
fn default_season_uids_are_unique() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let text = sink().render(&schedule.instances);
    let uids: Vec<&str> = text.lines().filter(|l| l.starts_with("UID:")).collect();
    let unique: HashSet<&str> = uids.iter().copied().collect();
    assert_eq!(uids.len(), 82);
    assert_eq!(unique.len(), uids.len());
}

#[test]
fn custom_time_zone_is_written() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let sink = CalendarSink::new(CalendarOptions {
        time_zone: "America/Denver".into(),
        ..CalendarOptions::default()
    });
    let text = sink.render(&schedule.instances);
    assert!(text.contains("X-WR-TIMEZONE:America/Denver\r\n"));
    assert!(text.contains("DTSTART;TZID=America/Denver:"));
}

#[test]
fn write_saves_the_rendered_document() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.ics");
    let sink = sink();
    sink.write(&schedule.instances, &path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        sink.render(&schedule.instances)
    );
}
