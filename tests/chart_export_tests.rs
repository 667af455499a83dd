use climbing_plan::export::{ChartData, ChartOptions, ChartSink};
use climbing_plan::{Category, PlanConfig, build_schedule};
use tempfile::tempdir;

fn unlabelled() -> ChartSink {
    ChartSink::new(ChartOptions {
        width: 400,
        height: 200,
        font_path: None,
        search_system_fonts: false,
    })
}

#[test]
fn bar_heights_come_from_week_loads() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let data = ChartData::from_loads(&schedule.week_loads);

    assert_eq!(data.bars.len(), schedule.week_loads.len());
    for (bar, load) in data.bars.iter().zip(&schedule.week_loads) {
        assert_eq!(bar.week_number, load.week_number);
        assert!((bar.total_hours - f64::from(load.total_minutes) / 60.0).abs() < 1e-9);
        let stacked: f64 = bar.segments.iter().map(|(_, h)| h).sum();
        assert!((stacked - bar.total_hours).abs() < 1e-9);
    }
}

#[test]
fn empty_weeks_keep_a_zero_bar() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let data = ChartData::from_loads(&schedule.week_loads);
    let bar = data.bar(31).unwrap();
    assert_eq!(bar.label, "W31");
    assert_eq!(bar.total_hours, 0.0);
    assert!(bar.segments.iter().all(|(_, h)| *h == 0.0));
}

#[test]
fn segments_follow_category_order() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let data = ChartData::from_loads(&schedule.week_loads);
    let bar = data.bar(19).unwrap();
    let categories: Vec<Category> = bar.segments.iter().map(|(c, _)| *c).collect();
    assert_eq!(categories, Category::ALL.to_vec());
    assert_eq!(bar.segments[1], (Category::Lead, 6.0));
    assert!((data.max_hours() - 11.25).abs() < 1e-9);
}

#[test]
fn writes_png_without_fonts() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("load.png");
    unlabelled().write(&schedule.week_loads, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[test]
fn writes_svg_when_asked() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("load.svg");
    unlabelled().write(&schedule.week_loads, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("<svg"));
    assert!(text.contains("<rect"));
}

#[test]
fn missing_directory_is_a_chart_error() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("load.png");
    assert!(unlabelled().write(&schedule.week_loads, &path).is_err());
}
