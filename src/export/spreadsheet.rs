use super::Exporter;
use crate::error::SinkWriteError;
use crate::scheduler::{SessionInstance, TrainingSchedule, WeekInfo, WeekLoad};
use crate::session::{Category, SessionDefinition};
use log::info;
use polars::prelude::*;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use std::collections::HashSet;
use std::path::Path;

pub const LABEL_COLUMN: &str = "label";
const SHEET_NAME: &str = "Plan";
const TITLE: &str = "Climbing Training Plan";
const TITLE_COLOR: u32 = 0xDDEBF7;
const FONT: &str = "Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRow {
    Weeks,
    StartDate,
    Kind,
    Load,
}

impl HeaderRow {
    const ALL: [HeaderRow; 4] = [
        HeaderRow::Weeks,
        HeaderRow::StartDate,
        HeaderRow::Kind,
        HeaderRow::Load,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HeaderRow::Weeks => "Weeks",
            HeaderRow::StartDate => "Start date",
            HeaderRow::Kind => "Type",
            HeaderRow::Load => "Load",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridRow {
    Header(HeaderRow),
    Category(Category),
    Session {
        code: String,
        category: Category,
        emphasized: bool,
    },
}

/// Sessions-by-week matrix: a label column followed by one column per week.
#[derive(Debug, Clone)]
pub struct SpreadsheetGrid {
    frame: DataFrame,
    rows: Vec<GridRow>,
    weeks: Vec<WeekInfo>,
}

impl SpreadsheetGrid {
    pub fn build(
        instances: &[SessionInstance],
        week_loads: &[WeekLoad],
        definitions: &[SessionDefinition],
        weeks: &[WeekInfo],
    ) -> PolarsResult<Self> {
        let occurs: HashSet<(&str, u32)> = instances
            .iter()
            .map(|instance| (instance.session_code.as_str(), instance.week_number))
            .collect();

        let mut rows = Vec::new();
        let mut cells: Vec<Vec<String>> = Vec::new();

        for header in HeaderRow::ALL {
            let values = weeks
                .iter()
                .map(|week| match header {
                    HeaderRow::Weeks => week.label(),
                    HeaderRow::StartDate => week.monday.format("%-d-%b").to_string(),
                    HeaderRow::Kind => week.kind.title().to_string(),
                    HeaderRow::Load => {
                        let load = week_loads
                            .iter()
                            .find(|load| load.week_number == week.week_number)
                            .map(WeekLoad::total_hours)
                            .unwrap_or(0.0);
                        format!("{load:.1} hours")
                    }
                })
                .collect::<Vec<_>>();
            cells.push(labelled(header.label(), values));
            rows.push(GridRow::Header(header));
        }

        for category in Category::ALL {
            cells.push(labelled(category.label(), vec![String::new(); weeks.len()]));
            rows.push(GridRow::Category(category));

            for definition in definitions.iter().filter(|d| d.category == category) {
                let values = weeks
                    .iter()
                    .map(|week| {
                        if occurs.contains(&(definition.code.as_str(), week.week_number)) {
                            definition.display_name.clone()
                        } else {
                            String::new()
                        }
                    })
                    .collect();
                cells.push(labelled(&definition.display_name, values));
                rows.push(GridRow::Session {
                    code: definition.code.clone(),
                    category,
                    emphasized: definition.emphasized,
                });
            }
        }

        let mut columns: Vec<Column> = Vec::with_capacity(weeks.len() + 1);
        let labels: Vec<&str> = cells.iter().map(|row| row[0].as_str()).collect();
        columns.push(Series::new(PlSmallStr::from_static(LABEL_COLUMN), labels).into_column());
        for (idx, week) in weeks.iter().enumerate() {
            let values: Vec<&str> = cells.iter().map(|row| row[idx + 1].as_str()).collect();
            columns.push(Series::new(week.label().as_str().into(), values).into_column());
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
            rows,
            weeks: weeks.to_vec(),
        })
    }

    pub fn from_schedule(schedule: &TrainingSchedule) -> PolarsResult<Self> {
        Self::build(
            &schedule.instances,
            &schedule.week_loads,
            &schedule.definitions,
            &schedule.weeks,
        )
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn weeks(&self) -> &[WeekInfo] {
        &self.weeks
    }

    pub fn cell(&self, row: usize, week: u32) -> PolarsResult<Option<&str>> {
        let name = format!("Week {week}");
        Ok(self.frame.column(&name)?.str()?.get(row))
    }

    pub fn session_row(&self, code: &str) -> Option<usize> {
        self.rows.iter().position(|row| {
            matches!(row, GridRow::Session { code: row_code, .. } if row_code == code)
        })
    }

    /// Weeks whose cell in the row of `code` is filled.
    pub fn weeks_with_session(&self, code: &str) -> PolarsResult<Vec<u32>> {
        let Some(row) = self.session_row(code) else {
            return Ok(Vec::new());
        };
        let mut weeks = Vec::new();
        for week in &self.weeks {
            if self
                .cell(row, week.week_number)?
                .is_some_and(|value| !value.is_empty())
            {
                weeks.push(week.week_number);
            }
        }
        Ok(weeks)
    }

    /// Row-major copy of the frame, label first.
    pub fn text_rows(&self) -> PolarsResult<Vec<Vec<String>>> {
        let columns = self
            .frame
            .get_columns()
            .iter()
            .map(|column| column.str())
            .collect::<PolarsResult<Vec<_>>>()?;
        Ok((0..self.frame.height())
            .map(|row| {
                columns
                    .iter()
                    .map(|column| column.get(row).unwrap_or("").to_string())
                    .collect()
            })
            .collect())
    }

    fn write_workbook(&self, cells: &[Vec<String>], destination: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let base = Format::new().set_font_name(FONT);
        let last_col = self.weeks.len() as u16;
        worksheet.merge_range(
            0,
            0,
            0,
            last_col,
            TITLE,
            &base
                .clone()
                .set_bold()
                .set_font_size(14)
                .set_align(FormatAlign::Center)
                .set_background_color(Color::RGB(TITLE_COLOR)),
        )?;

        for (idx, (row, values)) in self.rows.iter().zip(cells).enumerate() {
            let sheet_row = idx as u32 + 1;
            let label = values[0].as_str();
            match row {
                GridRow::Header(header) => {
                    worksheet.write_string_with_format(sheet_row, 0, label, &base.clone().set_bold())?;
                    for (col, week) in self.weeks.iter().enumerate() {
                        let value = values[col + 1].as_str();
                        let format = match header {
                            HeaderRow::Kind => base
                                .clone()
                                .set_italic()
                                .set_background_color(Color::RGB(week.kind.color())),
                            _ => base.clone(),
                        };
                        worksheet.write_string_with_format(sheet_row, col as u16 + 1, value, &format)?;
                    }
                }
                GridRow::Category(category) => {
                    let fill = base.clone().set_background_color(Color::RGB(category.color()));
                    worksheet.write_string_with_format(
                        sheet_row,
                        0,
                        label,
                        &fill.clone().set_bold().set_border_bottom(FormatBorder::Thin),
                    )?;
                    for col in 1..=last_col {
                        worksheet.write_blank(sheet_row, col, &fill)?;
                    }
                }
                GridRow::Session {
                    category,
                    emphasized,
                    ..
                } => {
                    let fill = base.clone().set_background_color(Color::RGB(category.color()));
                    let label_format = if *emphasized {
                        fill.clone().set_bold()
                    } else {
                        fill.clone()
                    };
                    worksheet.write_string_with_format(sheet_row, 0, label, &label_format)?;
                    for (col, value) in values.iter().enumerate().skip(1) {
                        if !value.is_empty() {
                            worksheet.write_string_with_format(sheet_row, col as u16, value, &fill)?;
                        }
                    }
                }
            }
        }

        worksheet.set_column_width(0, 35)?;
        for col in 1..=last_col {
            worksheet.set_column_width(col, 18)?;
        }
        worksheet.set_freeze_panes(HeaderRow::ALL.len() as u32 + 1, 1)?;
        workbook.save(destination)?;
        Ok(())
    }
}

fn labelled(label: &str, values: Vec<String>) -> Vec<String> {
    let mut row = Vec::with_capacity(values.len() + 1);
    row.push(label.to_string());
    row.extend(values);
    row
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetSink;

impl SpreadsheetSink {
    pub fn write(
        &self,
        instances: &[SessionInstance],
        week_loads: &[WeekLoad],
        definitions: &[SessionDefinition],
        weeks: &[WeekInfo],
        destination: &Path,
    ) -> Result<(), SinkWriteError> {
        let grid = SpreadsheetGrid::build(instances, week_loads, definitions, weeks)?;
        let cells = grid.text_rows()?;
        grid.write_workbook(&cells, destination)
            .map_err(|source| SinkWriteError::Spreadsheet {
                path: destination.to_path_buf(),
                source,
            })?;
        info!(
            "spreadsheet with {} rows saved: {}",
            grid.rows().len(),
            destination.display()
        );
        Ok(())
    }
}

impl Exporter for SpreadsheetSink {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn export(&self, schedule: &TrainingSchedule, destination: &Path) -> Result<(), SinkWriteError> {
        self.write(
            &schedule.instances,
            &schedule.week_loads,
            &schedule.definitions,
            &schedule.weeks,
            destination,
        )
    }
}
