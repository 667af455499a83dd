use crate::catalog::Catalog;
use crate::error::ConfigurationError;
use crate::plan::{Plan, PlanSpec};
use crate::session::{Category, SessionDefinition};
use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIME_ZONE: &str = "Europe/Paris";

/// Every constant input of a run. The default reproduces the 2025 season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Monday of `first_week`.
    pub anchor_date: NaiveDate,
    pub first_week: u32,
    pub last_week: u32,
    #[serde(default)]
    pub deload_weeks: Vec<u32>,
    #[serde(default)]
    pub send_weeks: Vec<u32>,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Skip unknown session codes with a warning instead of failing.
    #[serde(default)]
    pub skip_unknown_sessions: bool,
    pub sessions: Vec<SessionDefinition>,
    pub weeks: Vec<WeekEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekEntry {
    pub week: u32,
    /// Either a JSON list of codes or a comma-separated string ("F, V1, R").
    #[serde(deserialize_with = "session_list")]
    pub sessions: Vec<String>,
}

impl WeekEntry {
    pub fn new(week: u32, sessions: &str) -> Self {
        Self {
            week,
            sessions: parse_session_list(sessions),
        }
    }
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

/// Splits "F, F, V1" into codes, ignoring empty items.
pub fn parse_session_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn session_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => parse_session_list(&text),
        Raw::List(codes) => codes
            .into_iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect(),
    })
}

impl PlanConfig {
    pub fn catalog(&self) -> Result<Catalog, ConfigurationError> {
        Catalog::new(self.sessions.iter().cloned())
    }

    pub fn plan(&self) -> Result<Plan, ConfigurationError> {
        let mut sessions = BTreeMap::new();
        for entry in &self.weeks {
            if sessions.insert(entry.week, entry.sessions.clone()).is_some() {
                return Err(ConfigurationError::PlanRange(format!(
                    "week {} is planned more than once",
                    entry.week
                )));
            }
        }
        Plan::new(PlanSpec {
            first_week: self.first_week,
            last_week: self.last_week,
            sessions,
            deload_weeks: self.deload_weeks.clone(),
            send_weeks: self.send_weeks.clone(),
        })
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).expect("valid session time");
        let sessions = vec![
            SessionDefinition::new(
                "F",
                "Glutes + Core",
                Category::Conditioning,
                [Weekday::Wed, Weekday::Sat],
                at(18, 0),
                30,
            ),
            SessionDefinition::new("R", "Run", Category::Conditioning, [Weekday::Wed], at(7, 0), 60),
            SessionDefinition::new("V1", "Max Route", Category::Lead, [Weekday::Sun], at(10, 0), 240)
                .emphasized(),
            SessionDefinition::new("V2", "Doublettes", Category::Lead, [Weekday::Tue], at(18, 0), 120),
            SessionDefinition::new("V3", "4X4", Category::Bouldering, [Weekday::Tue], at(18, 0), 120),
            SessionDefinition::new(
                "E1",
                "Finger Endurance",
                Category::Fingers,
                [Weekday::Fri],
                at(18, 0),
                45,
            ),
            SessionDefinition::new(
                "E2",
                "Low Intensity Endurance",
                Category::Fingers,
                [Weekday::Fri],
                at(19, 0),
                30,
            ),
            SessionDefinition::new(
                "D1",
                "Max Finger Strength",
                Category::Fingers,
                [Weekday::Fri],
                at(20, 0),
                45,
            )
            .emphasized(),
            SessionDefinition::new(
                "B1",
                "Max Bouldering",
                Category::Bouldering,
                [Weekday::Thu],
                at(18, 0),
                120,
            ),
        ];

        let weeks = vec![
            WeekEntry::new(19, "F, V1, V2, E1, E2, D1, R"),
            WeekEntry::new(20, "F, V1, V3, E1, E2, D1, R"),
            WeekEntry::new(21, "F, V1, V2, E1, E2, D1, R"),
            WeekEntry::new(22, "F, V1, V3, E1, E2, D1, R"),
            WeekEntry::new(23, "F, V1, B1, R"),
            WeekEntry::new(24, "F, V1, B1, R"),
            WeekEntry::new(25, "F, V1, V2, E1, E2, B1, R"),
            WeekEntry::new(26, "F, V1, V3, E1, E2, B1, R"),
            WeekEntry::new(27, "F, V1, B1, R"),
            WeekEntry::new(28, "F, V1, V2, E2, B1, R"),
            WeekEntry::new(29, "F, V1, V3, E2, B1, R"),
            WeekEntry::new(30, "F, V1, B1, R"),
            WeekEntry::new(31, ""),
            WeekEntry::new(32, ""),
        ];

        Self {
            anchor_date: NaiveDate::from_ymd_opt(2025, 5, 5).expect("valid anchor date"),
            first_week: 19,
            last_week: 32,
            deload_weeks: vec![23, 24, 27, 30],
            send_weeks: vec![31, 32],
            time_zone: default_time_zone(),
            skip_unknown_sessions: false,
            sessions,
            weeks,
        }
    }
}

pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> Result<PlanConfig, ConfigurationError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigurationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_config_to_json<P: AsRef<Path>>(config: &PlanConfig, path: P) -> std::io::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

/// Destinations of the four artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub calendar: PathBuf,
    pub spreadsheet: PathBuf,
    pub chart: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            calendar: dir.join("climbing_plan.ics"),
            spreadsheet: dir.join("climbing_training_plan.xlsx"),
            chart: dir.join("training_load_chart.png"),
            summary: dir.join("training_load.csv"),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}
