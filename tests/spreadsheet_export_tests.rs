use climbing_plan::export::SpreadsheetGrid;
use climbing_plan::export::spreadsheet::{GridRow, HeaderRow, SpreadsheetSink};
use climbing_plan::{Category, PlanConfig, build_schedule};
use std::collections::BTreeSet;
use tempfile::tempdir;

fn grid() -> SpreadsheetGrid {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    SpreadsheetGrid::from_schedule(&schedule).unwrap()
}

#[test]
fn grid_has_label_column_and_one_column_per_week() {
    let grid = grid();
    let frame = grid.frame();
    assert_eq!(frame.width(), 15);
    assert_eq!(frame.get_column_names()[0].as_str(), "label");
    assert_eq!(frame.get_column_names()[1].as_str(), "Week 19");
    assert_eq!(frame.get_column_names()[14].as_str(), "Week 32");
    // 4 header rows, 4 category rows, 9 sessions
    assert_eq!(frame.height(), 17);
}

#[test]
fn header_rows_describe_each_week() {
    let grid = grid();
    assert_eq!(grid.rows()[0], GridRow::Header(HeaderRow::Weeks));
    assert_eq!(grid.cell(0, 19).unwrap(), Some("Week 19"));
    assert_eq!(grid.cell(1, 19).unwrap(), Some("5-May"));
    assert_eq!(grid.cell(1, 27).unwrap(), Some("30-Jun"));
    assert_eq!(grid.cell(2, 19).unwrap(), Some("Training"));
    assert_eq!(grid.cell(2, 23).unwrap(), Some("Deload"));
    assert_eq!(grid.cell(2, 32).unwrap(), Some("Send"));
    assert_eq!(grid.cell(3, 19).unwrap(), Some("10.0 hours"));
    assert_eq!(grid.cell(3, 28).unwrap(), Some("10.5 hours"));
    assert_eq!(grid.cell(3, 31).unwrap(), Some("0.0 hours"));
}

#[test]
fn sessions_are_grouped_under_their_category() {
    let grid = grid();
    let layout: Vec<String> = grid
        .rows()
        .iter()
        .filter_map(|row| match row {
            GridRow::Header(_) => None,
            GridRow::Category(category) => Some(category.label().to_string()),
            GridRow::Session { code, .. } => Some(code.clone()),
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            "Conditioning", "F", "R", "Lead", "V1", "V2", "Fingers", "E1", "E2", "D1",
            "Bouldering", "V3", "B1",
        ]
    );
    assert!(matches!(
        grid.rows()[grid.session_row("V1").unwrap()],
        GridRow::Session { emphasized: true, category: Category::Lead, .. }
    ));
}

#[test]
fn filled_cells_match_scheduled_weeks() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let grid = SpreadsheetGrid::from_schedule(&schedule).unwrap();

    for definition in &schedule.definitions {
        let expected: Vec<u32> = schedule
            .instances
            .iter()
            .filter(|i| i.session_code == definition.code)
            .map(|i| i.week_number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        assert_eq!(
            grid.weeks_with_session(&definition.code).unwrap(),
            expected,
            "{}",
            definition.code
        );
    }

    assert_eq!(grid.weeks_with_session("V2").unwrap(), vec![19, 21, 25, 28]);
    assert_eq!(grid.weeks_with_session("D1").unwrap(), vec![19, 20, 21, 22]);
    assert_eq!(grid.weeks_with_session("B1").unwrap(), (23..=30).collect::<Vec<_>>());
}

#[test]
fn filled_cells_carry_the_display_name() {
    let grid = grid();
    let row = grid.session_row("E2").unwrap();
    assert_eq!(grid.cell(row, 19).unwrap(), Some("Low Intensity Endurance"));
    assert_eq!(grid.cell(row, 23).unwrap(), Some(""));
}

#[test]
fn text_rows_mirror_the_frame() {
    let grid = grid();
    let rows = grid.text_rows().unwrap();
    assert_eq!(rows.len(), 17);
    assert!(rows.iter().all(|row| row.len() == 15));
    assert_eq!(rows[3][0], "Load");
    assert_eq!(rows[4][0], "Conditioning");
    assert_eq!(rows[5][1], "Glutes + Core");
}

#[test]
fn writes_an_xlsx_workbook() {
    let schedule = build_schedule(&PlanConfig::default()).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.xlsx");
    SpreadsheetSink
        .write(
            &schedule.instances,
            &schedule.week_loads,
            &schedule.definitions,
            &schedule.weeks,
            &path,
        )
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.len() > 1000);
    assert_eq!(&bytes[..2], b"PK");
}
