use super::Exporter;
use crate::error::SinkWriteError;
use crate::scheduler::{TrainingSchedule, WeekInfo, WeekLoad};
use crate::session::Category;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Weekly load table as CSV: week, start date, kind, totals, minutes per category.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummarySink;

impl SummarySink {
    pub fn write(
        &self,
        week_loads: &[WeekLoad],
        weeks: &[WeekInfo],
        destination: &Path,
    ) -> Result<(), SinkWriteError> {
        let csv_err = |source| SinkWriteError::Csv {
            path: destination.to_path_buf(),
            source,
        };
        let file = File::create(destination).map_err(|err| SinkWriteError::io(destination, err))?;
        let mut writer = ::csv::Writer::from_writer(file);

        let mut header = vec![
            "week".to_string(),
            "start_date".to_string(),
            "kind".to_string(),
            "total_minutes".to_string(),
            "total_hours".to_string(),
        ];
        header.extend(
            Category::ALL
                .iter()
                .map(|category| format!("{}_minutes", category.label().to_ascii_lowercase())),
        );
        writer.write_record(&header).map_err(csv_err)?;

        for load in week_loads {
            let week = weeks.iter().find(|w| w.week_number == load.week_number);
            let mut record = vec![
                load.week_number.to_string(),
                week.map(|w| w.monday.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                week.map(|w| w.kind.as_str().to_string()).unwrap_or_default(),
                load.total_minutes.to_string(),
                format!("{:.2}", load.total_hours()),
            ];
            record.extend(
                Category::ALL
                    .iter()
                    .map(|&category| load.category_minutes(category).to_string()),
            );
            writer.write_record(&record).map_err(csv_err)?;
        }
        writer
            .flush()
            .map_err(|err| SinkWriteError::io(destination, err))?;
        info!("load summary saved: {}", destination.display());
        Ok(())
    }
}

/// The same table as a DataFrame, for display.
pub fn load_frame(week_loads: &[WeekLoad], weeks: &[WeekInfo]) -> PolarsResult<DataFrame> {
    let find = |n: u32| weeks.iter().find(|w| w.week_number == n);
    let week: Vec<i64> = week_loads.iter().map(|l| i64::from(l.week_number)).collect();
    let start: Vec<String> = week_loads
        .iter()
        .map(|l| {
            find(l.week_number)
                .map(|w| w.monday.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .collect();
    let kind: Vec<&str> = week_loads
        .iter()
        .map(|l| find(l.week_number).map(|w| w.kind.as_str()).unwrap_or(""))
        .collect();
    let hours: Vec<String> = week_loads
        .iter()
        .map(|l| format!("{:.1}", l.total_hours()))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(4 + Category::ALL.len());
    columns.push(Series::new(PlSmallStr::from_static("week"), week).into_column());
    columns.push(Series::new(PlSmallStr::from_static("start_date"), start).into_column());
    columns.push(Series::new(PlSmallStr::from_static("kind"), kind).into_column());
    columns.push(Series::new(PlSmallStr::from_static("hours"), hours).into_column());
    for category in Category::ALL {
        let minutes: Vec<i64> = week_loads
            .iter()
            .map(|l| i64::from(l.category_minutes(category)))
            .collect();
        columns.push(
            Series::new(category.label().to_ascii_lowercase().as_str().into(), minutes)
                .into_column(),
        );
    }
    DataFrame::new(columns)
}

impl Exporter for SummarySink {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn export(&self, schedule: &TrainingSchedule, destination: &Path) -> Result<(), SinkWriteError> {
        self.write(&schedule.week_loads, &schedule.weeks, destination)
    }
}
