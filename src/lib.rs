pub mod calendar;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod plan;
pub mod scheduler;
pub mod session;

pub use calendar::TrainingCalendar;
pub use catalog::Catalog;
pub use config::{
    OutputPaths, PlanConfig, WeekEntry, load_config_from_json, parse_session_list,
    save_config_to_json,
};
pub use error::{ConfigurationError, PlanError, SinkWriteError};
pub use pipeline::{ExportMode, RunOptions, RunReport, build_schedule, generate};
pub use plan::{Plan, PlanSpec, WeekPlan};
pub use scheduler::{
    Scheduler, SchedulerOptions, SessionInstance, TrainingSchedule, WeekInfo, WeekLoad,
};
pub use session::{Category, SessionDefinition, WeekKind};
