use crate::catalog::Catalog;
use crate::error::ConfigurationError;
use crate::session::WeekKind;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekPlan {
    pub week_number: u32,
    pub kind: WeekKind,
    pub session_codes: Vec<String>,
}

/// Ordered, gap-free mapping of week numbers to their planned sessions.
#[derive(Debug, Clone)]
pub struct Plan {
    weeks: BTreeMap<u32, WeekPlan>,
}

/// Raw inputs for [`Plan::new`]; mirrors the configuration file layout.
#[derive(Debug, Clone, Default)]
pub struct PlanSpec {
    pub first_week: u32,
    pub last_week: u32,
    pub sessions: BTreeMap<u32, Vec<String>>,
    pub deload_weeks: Vec<u32>,
    pub send_weeks: Vec<u32>,
}

impl Plan {
    pub fn new(input: PlanSpec) -> Result<Self, ConfigurationError> {
        let PlanSpec {
            first_week,
            last_week,
            mut sessions,
            deload_weeks,
            send_weeks,
        } = input;

        if first_week > last_week {
            return Err(ConfigurationError::PlanRange(format!(
                "first week {first_week} is after last week {last_week}"
            )));
        }
        if let Some(&week) = sessions
            .keys()
            .find(|&&w| w < first_week || w > last_week)
        {
            return Err(ConfigurationError::PlanRange(format!(
                "week {week} is outside {first_week}..={last_week}"
            )));
        }

        let deload: BTreeSet<u32> = deload_weeks.into_iter().collect();
        let send: BTreeSet<u32> = send_weeks.into_iter().collect();
        for &week in deload.iter().chain(send.iter()) {
            if week < first_week || week > last_week {
                return Err(ConfigurationError::PlanRange(format!(
                    "week kind override for week {week} is outside {first_week}..={last_week}"
                )));
            }
        }
        if let Some(week) = deload.intersection(&send).next() {
            return Err(ConfigurationError::PlanRange(format!(
                "week {week} is listed as both deload and send"
            )));
        }

        let mut weeks = BTreeMap::new();
        for week_number in first_week..=last_week {
            let session_codes = sessions.remove(&week_number).ok_or_else(|| {
                ConfigurationError::PlanRange(format!("no session list for week {week_number}"))
            })?;
            let kind = if send.contains(&week_number) {
                WeekKind::Send
            } else if deload.contains(&week_number) {
                WeekKind::Deload
            } else {
                WeekKind::Training
            };
            weeks.insert(
                week_number,
                WeekPlan {
                    week_number,
                    kind,
                    session_codes,
                },
            );
        }

        Ok(Self { weeks })
    }

    /// Builds a plan from explicit week entries, which must be contiguous.
    pub fn from_weeks<I>(entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = WeekPlan>,
    {
        let mut weeks = BTreeMap::new();
        for entry in entries {
            let week_number = entry.week_number;
            if weeks.insert(week_number, entry).is_some() {
                return Err(ConfigurationError::PlanRange(format!(
                    "week {week_number} is planned more than once"
                )));
            }
        }
        let (Some(&first), Some(&last)) = (weeks.keys().next(), weeks.keys().next_back()) else {
            return Err(ConfigurationError::PlanRange("plan has no weeks".into()));
        };
        if let Some(missing) = (first..=last).find(|w| !weeks.contains_key(w)) {
            return Err(ConfigurationError::PlanRange(format!(
                "week {missing} is missing between {first} and {last}"
            )));
        }
        Ok(Self { weeks })
    }

    pub fn weeks_in_order(&self) -> Vec<u32> {
        self.weeks.keys().copied().collect()
    }

    pub fn first_week(&self) -> u32 {
        self.weeks.keys().next().copied().unwrap_or_default()
    }

    pub fn sessions_for(&self, week: u32) -> &[String] {
        self.weeks
            .get(&week)
            .map(|plan| plan.session_codes.as_slice())
            .unwrap_or(&[])
    }

    pub fn kind_of(&self, week: u32) -> WeekKind {
        self.weeks
            .get(&week)
            .map(|plan| plan.kind)
            .unwrap_or_default()
    }

    pub fn week(&self, week: u32) -> Option<&WeekPlan> {
        self.weeks.get(&week)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeekPlan> {
        self.weeks.values()
    }

    /// Fails on the first code that the catalog does not define.
    pub fn validate_against(&self, catalog: &Catalog) -> Result<(), ConfigurationError> {
        for week in self.weeks.values() {
            if let Some(code) = week.session_codes.iter().find(|c| !catalog.contains(c)) {
                return Err(ConfigurationError::UnknownSessionCode {
                    code: code.clone(),
                    week: Some(week.week_number),
                });
            }
        }
        Ok(())
    }
}
