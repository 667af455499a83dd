use crate::error::ConfigurationError;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Maps plan week numbers onto real dates.
///
/// Week `first_week` starts on `anchor` (a Monday); every later week starts a
/// whole number of weeks after it, so no month or DST adjustment is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingCalendar {
    anchor: NaiveDate,
    first_week: u32,
}

impl TrainingCalendar {
    pub fn new(anchor: NaiveDate, first_week: u32) -> Result<Self, ConfigurationError> {
        if anchor.weekday() != Weekday::Mon {
            return Err(ConfigurationError::InvalidAnchor(anchor));
        }
        Ok(Self { anchor, first_week })
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn first_week(&self) -> u32 {
        self.first_week
    }

    /// Monday of the given plan week. Weeks before `first_week` map backwards.
    pub fn monday_of(&self, week: u32) -> NaiveDate {
        let offset = i64::from(week) - i64::from(self.first_week);
        self.anchor + Duration::weeks(offset)
    }

    pub fn date_of(&self, week: u32, weekday: Weekday) -> NaiveDate {
        self.monday_of(week) + Duration::days(i64::from(weekday.num_days_from_monday()))
    }

    pub fn datetime_of(&self, week: u32, weekday: Weekday, time: NaiveTime) -> NaiveDateTime {
        self.date_of(week, weekday).and_time(time)
    }

    /// Plan week containing `date`, if it falls on or after the anchor.
    pub fn week_of(&self, date: NaiveDate) -> Option<u32> {
        let days = (date - self.anchor).num_days();
        if days < 0 {
            return None;
        }
        u32::try_from(days / 7)
            .ok()
            .and_then(|offset| self.first_week.checked_add(offset))
    }
}
