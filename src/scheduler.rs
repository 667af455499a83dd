use crate::calendar::TrainingCalendar;
use crate::catalog::Catalog;
use crate::error::ConfigurationError;
use crate::plan::Plan;
use crate::session::{Category, SessionDefinition, WeekKind};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

/// One dated occurrence of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInstance {
    pub session_code: String,
    pub display_name: String,
    pub category: Category,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub week_number: u32,
    pub week_kind: WeekKind,
    pub duration_minutes: u32,
}

/// Scheduled minutes for one week. Hours are derived here and nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekLoad {
    pub week_number: u32,
    pub total_minutes: u32,
    pub per_category_minutes: BTreeMap<Category, u32>,
}

impl WeekLoad {
    pub fn empty(week_number: u32) -> Self {
        Self {
            week_number,
            total_minutes: 0,
            per_category_minutes: BTreeMap::new(),
        }
    }

    fn add(&mut self, category: Category, minutes: u32) {
        self.total_minutes += minutes;
        *self.per_category_minutes.entry(category).or_insert(0) += minutes;
    }

    pub fn category_minutes(&self, category: Category) -> u32 {
        self.per_category_minutes
            .get(&category)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_hours(&self) -> f64 {
        minutes_to_hours(self.total_minutes)
    }

    pub fn category_hours(&self, category: Category) -> f64 {
        minutes_to_hours(self.category_minutes(category))
    }
}

fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes) / 60.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekInfo {
    pub week_number: u32,
    pub monday: NaiveDate,
    pub kind: WeekKind,
}

impl WeekInfo {
    pub fn label(&self) -> String {
        format!("Week {}", self.week_number)
    }
}

/// Everything the sinks need, computed once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSchedule {
    pub weeks: Vec<WeekInfo>,
    pub instances: Vec<SessionInstance>,
    pub week_loads: Vec<WeekLoad>,
    pub definitions: Vec<SessionDefinition>,
}

impl TrainingSchedule {
    pub fn weeks_in_order(&self) -> Vec<u32> {
        self.weeks.iter().map(|w| w.week_number).collect()
    }

    pub fn load_for(&self, week: u32) -> Option<&WeekLoad> {
        self.week_loads.iter().find(|load| load.week_number == week)
    }

    pub fn instances_in(&self, week: u32) -> impl Iterator<Item = &SessionInstance> {
        self.instances
            .iter()
            .filter(move |instance| instance.week_number == week)
    }

    pub fn total_minutes(&self) -> u32 {
        self.week_loads.iter().map(|load| load.total_minutes).sum()
    }

    pub fn total_hours(&self) -> f64 {
        minutes_to_hours(self.total_minutes())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerOptions {
    /// Skip codes missing from the catalog instead of failing.
    pub skip_unknown_sessions: bool,
}

pub struct Scheduler<'a> {
    catalog: &'a Catalog,
    plan: &'a Plan,
    calendar: TrainingCalendar,
    options: SchedulerOptions,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        catalog: &'a Catalog,
        plan: &'a Plan,
        anchor: NaiveDate,
    ) -> Result<Self, ConfigurationError> {
        let calendar = TrainingCalendar::new(anchor, plan.first_week())?;
        Ok(Self {
            catalog,
            plan,
            calendar,
            options: SchedulerOptions::default(),
        })
    }

    pub fn with_options(mut self, options: SchedulerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn calendar(&self) -> &TrainingCalendar {
        &self.calendar
    }

    pub fn build(&self) -> Result<TrainingSchedule, ConfigurationError> {
        let mut weeks = Vec::new();
        let mut instances = Vec::new();
        let mut week_loads = Vec::new();

        for week_number in self.plan.weeks_in_order() {
            let kind = self.plan.kind_of(week_number);
            let info = WeekInfo {
                week_number,
                monday: self.calendar.monday_of(week_number),
                kind,
            };
            let (mut week_instances, load) = self.expand_week(info)?;
            debug!(
                "week {} ({}): {} sessions, {} minutes",
                week_number,
                kind,
                week_instances.len(),
                load.total_minutes
            );
            weeks.push(info);
            instances.append(&mut week_instances);
            week_loads.push(load);
        }

        info!(
            "scheduled {} sessions across {} weeks",
            instances.len(),
            weeks.len()
        );

        Ok(TrainingSchedule {
            weeks,
            instances,
            week_loads,
            definitions: self.catalog.definitions().to_vec(),
        })
    }

    fn expand_week(
        &self,
        week: WeekInfo,
    ) -> Result<(Vec<SessionInstance>, WeekLoad), ConfigurationError> {
        let mut keyed = Vec::new();
        let mut load = WeekLoad::empty(week.week_number);

        for code in self.plan.sessions_for(week.week_number) {
            let definition = match self.catalog.get(code) {
                Some(definition) => definition,
                None if self.options.skip_unknown_sessions => {
                    warn!(
                        "skipping unknown session code '{}' in week {}",
                        code, week.week_number
                    );
                    continue;
                }
                None => {
                    return Err(ConfigurationError::UnknownSessionCode {
                        code: code.clone(),
                        week: Some(week.week_number),
                    });
                }
            };
            let order = self
                .catalog
                .declaration_index(&definition.code)
                .unwrap_or(usize::MAX);

            for &weekday in &definition.weekdays {
                let start =
                    self.calendar
                        .datetime_of(week.week_number, weekday, definition.start_time);
                let end = start + Duration::minutes(i64::from(definition.duration_minutes));
                load.add(definition.category, definition.duration_minutes);
                keyed.push((
                    (start, order),
                    SessionInstance {
                        session_code: definition.code.clone(),
                        display_name: definition.display_name.clone(),
                        category: definition.category,
                        start,
                        end,
                        week_number: week.week_number,
                        week_kind: week.kind,
                        duration_minutes: definition.duration_minutes,
                    },
                ));
            }
        }

        // Stable: repeated codes keep their plan order.
        keyed.sort_by_key(|(key, _)| *key);
        let instances = keyed.into_iter().map(|(_, instance)| instance).collect();
        Ok((instances, load))
    }
}
