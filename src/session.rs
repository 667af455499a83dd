use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training category. Declaration order is the display order used by every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Conditioning,
    Lead,
    Fingers,
    Bouldering,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Conditioning,
        Category::Lead,
        Category::Fingers,
        Category::Bouldering,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Conditioning => "Conditioning",
            Category::Lead => "Lead",
            Category::Fingers => "Fingers",
            Category::Bouldering => "Bouldering",
        }
    }

    /// Background colour as `0xRRGGBB`.
    pub fn color(&self) -> u32 {
        match self {
            Category::Conditioning => 0xD9EAD3,
            Category::Lead => 0xFCE5CD,
            Category::Fingers => 0xF4CCCC,
            Category::Bouldering => 0xCFE2F3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekKind {
    #[default]
    Training,
    Deload,
    Send,
}

impl WeekKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekKind::Training => "training",
            WeekKind::Deload => "deload",
            WeekKind::Send => "send",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WeekKind::Training => "Training",
            WeekKind::Deload => "Deload",
            WeekKind::Send => "Send",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            WeekKind::Training => 0xFFFFFF,
            WeekKind::Deload => 0xFFE599,
            WeekKind::Send => 0xC9F3C2,
        }
    }
}

impl fmt::Display for WeekKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template of a recurring session: what, when in the week, and for how long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDefinition {
    pub code: String,
    pub display_name: String,
    pub category: Category,
    pub weekdays: Vec<Weekday>,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    /// Rendered in bold in the spreadsheet.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub emphasized: bool,
}

impl SessionDefinition {
    pub fn new(
        code: impl Into<String>,
        display_name: impl Into<String>,
        category: Category,
        weekdays: impl IntoIterator<Item = Weekday>,
        start_time: NaiveTime,
        duration_minutes: u32,
    ) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            category,
            weekdays: weekdays.into_iter().collect(),
            start_time,
            duration_minutes,
            emphasized: false,
        }
    }

    pub fn emphasized(mut self) -> Self {
        self.emphasized = true;
        self
    }

    /// Weekdays sorted Monday..Sunday with duplicates removed.
    pub(crate) fn normalize_weekdays(&mut self) {
        self.weekdays.sort_by_key(|wd| wd.num_days_from_monday());
        self.weekdays
            .dedup_by(|a, b| a.num_days_from_monday() == b.num_days_from_monday());
    }
}

pub(crate) mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .map_err(|err| D::Error::custom(format!("invalid time '{raw}': {err}")))
    }
}
