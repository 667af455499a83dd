use super::Exporter;
use crate::config::DEFAULT_TIME_ZONE;
use crate::error::SinkWriteError;
use crate::scheduler::{SessionInstance, TrainingSchedule};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const UID_FORMAT: &str = "%Y%m%dT%H%M";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Clone)]
pub struct CalendarOptions {
    pub time_zone: String,
    pub product_id: String,
    /// DTSTAMP of every event. Defaults to the time of construction.
    pub generated_at: DateTime<Utc>,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            product_id: "-//ClimbingPlan//EN".to_string(),
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CalendarSink {
    options: CalendarOptions,
}

impl CalendarSink {
    pub fn new(options: CalendarOptions) -> Self {
        Self { options }
    }

    pub fn write(&self, instances: &[SessionInstance], destination: &Path) -> Result<(), SinkWriteError> {
        let text = self.render(instances);
        fs::write(destination, text).map_err(|err| SinkWriteError::io(destination, err))?;
        info!(
            "calendar with {} events saved: {}",
            instances.len(),
            destination.display()
        );
        Ok(())
    }

    /// Full iCalendar document, CRLF-terminated.
    pub fn render(&self, instances: &[SessionInstance]) -> String {
        let stamp = self.options.generated_at.format(UTC_FORMAT).to_string();
        let tz = &self.options.time_zone;
        let mut uids = UidAllocator::default();

        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", self.options.product_id),
            "CALSCALE:GREGORIAN".to_string(),
            format!("X-WR-TIMEZONE:{tz}"),
        ];
        for instance in instances {
            lines.push("BEGIN:VEVENT".to_string());
            lines.push(format!("UID:{}", uids.next(instance)));
            lines.push(format!("DTSTAMP:{stamp}"));
            lines.push(format!("DTSTART;TZID={tz}:{}", local(instance.start)));
            lines.push(format!("DTEND;TZID={tz}:{}", local(instance.end)));
            lines.push(format!("SUMMARY:{}", escape_text(&instance.display_name)));
            lines.push(format!(
                "DESCRIPTION:{}",
                escape_text(&format!(
                    "Week {} - {}",
                    instance.week_number, instance.week_kind
                ))
            ));
            lines.push(format!("CATEGORIES:{}", instance.category.label()));
            lines.push("END:VEVENT".to_string());
        }
        lines.push("END:VCALENDAR".to_string());

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
            out.push_str("\r\n");
        }
        out
    }
}

impl Exporter for CalendarSink {
    fn name(&self) -> &'static str {
        "calendar"
    }

    fn export(&self, schedule: &TrainingSchedule, destination: &Path) -> Result<(), SinkWriteError> {
        self.write(&schedule.instances, destination)
    }
}

fn local(at: NaiveDateTime) -> String {
    at.format(LOCAL_FORMAT).to_string()
}

/// Hands out `<Name>-<start>` identifiers, suffixing repeats with `-2`, `-3`, ...
#[derive(Default)]
struct UidAllocator {
    seen: HashMap<String, usize>,
}

impl UidAllocator {
    fn next(&mut self, instance: &SessionInstance) -> String {
        let base = format!(
            "{}-{}",
            instance.display_name.replace(' ', ""),
            instance.start.format(UID_FORMAT)
        );
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}-{count}")
        }
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

/// Splits content lines longer than 75 octets, continuing with a leading space.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    let mut limit = MAX_LINE_OCTETS;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > limit {
            out.push_str("\r\n ");
            width = 0;
            // continuation lines carry one leading space
            limit = MAX_LINE_OCTETS - 1;
        }
        out.push(ch);
        width += len;
    }
    out
}
