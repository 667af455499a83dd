use crate::error::SinkWriteError;
use crate::scheduler::TrainingSchedule;
use std::path::Path;

pub mod calendar;
pub mod chart;
pub mod spreadsheet;
pub mod summary;

pub use calendar::{CalendarOptions, CalendarSink};
pub use chart::{ChartData, ChartOptions, ChartSink};
pub use spreadsheet::{SpreadsheetGrid, SpreadsheetSink};
pub use summary::{SummarySink, load_frame};

/// One artifact writer. Sinks only read the schedule; they never recompute loads.
pub trait Exporter: Send + Sync {
    fn name(&self) -> &'static str;

    fn export(&self, schedule: &TrainingSchedule, destination: &Path) -> Result<(), SinkWriteError>;
}
