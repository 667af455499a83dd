use crate::config::{OutputPaths, PlanConfig};
use crate::error::{PlanError, SinkWriteError};
use crate::export::{
    CalendarOptions, CalendarSink, ChartOptions, ChartSink, Exporter, SpreadsheetSink, SummarySink,
};
use crate::scheduler::{Scheduler, SchedulerOptions, TrainingSchedule};
use log::{error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportMode {
    #[default]
    Sequential,
    /// Run every sink on the rayon pool and join before committing.
    Parallel,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: ExportMode,
    pub chart: ChartOptions,
    /// Overrides the DTSTAMP written to the calendar.
    pub generated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub schedule: TrainingSchedule,
    pub written: Vec<PathBuf>,
}

/// Validates the configuration and expands it into a schedule. Writes nothing.
pub fn build_schedule(config: &PlanConfig) -> Result<TrainingSchedule, PlanError> {
    let catalog = config.catalog()?;
    let plan = config.plan()?;
    if !config.skip_unknown_sessions {
        plan.validate_against(&catalog)?;
    }
    let schedule = Scheduler::new(&catalog, &plan, config.anchor_date)?
        .with_options(SchedulerOptions {
            skip_unknown_sessions: config.skip_unknown_sessions,
        })
        .build()?;
    Ok(schedule)
}

/// Runs the whole pipeline. Either every artifact is written or none is.
pub fn generate(
    config: &PlanConfig,
    outputs: &OutputPaths,
    options: &RunOptions,
) -> Result<RunReport, PlanError> {
    let schedule = build_schedule(config)?;

    let mut calendar_options = CalendarOptions {
        time_zone: config.time_zone.clone(),
        ..CalendarOptions::default()
    };
    if let Some(at) = options.generated_at {
        calendar_options.generated_at = at;
    }

    let jobs: Vec<(Box<dyn Exporter>, &Path)> = vec![
        (
            Box::new(CalendarSink::new(calendar_options)) as Box<dyn Exporter>,
            outputs.calendar.as_path(),
        ),
        (Box::new(SpreadsheetSink), outputs.spreadsheet.as_path()),
        (
            Box::new(ChartSink::new(options.chart.clone())),
            outputs.chart.as_path(),
        ),
        (Box::new(SummarySink), outputs.summary.as_path()),
    ];

    let written = export_all(&schedule, &jobs, options.mode)?;
    info!("generated {} artifacts", written.len());
    Ok(RunReport { schedule, written })
}

/// Writes each job to a staging file, then renames all of them into place.
/// Destinations are left as they were when any step fails.
pub fn export_all(
    schedule: &TrainingSchedule,
    jobs: &[(Box<dyn Exporter>, &Path)],
    mode: ExportMode,
) -> Result<Vec<PathBuf>, PlanError> {
    let staged: Vec<PathBuf> = jobs.iter().map(|(_, dest)| staging_path(dest)).collect();

    let run = |idx: usize| -> Result<(), PlanError> {
        let (sink, _) = &jobs[idx];
        sink.export(schedule, &staged[idx])
            .map_err(|source| PlanError::Sink {
                sink: sink.name(),
                source,
            })
    };

    let outcome = match mode {
        ExportMode::Sequential => (0..jobs.len()).try_for_each(run),
        ExportMode::Parallel => (0..jobs.len()).into_par_iter().try_for_each(run),
    };

    if let Err(err) = outcome {
        error!("{err}; discarding staged artifacts");
        discard(&staged);
        return Err(err);
    }

    commit(jobs, &staged)
}

/// A destination that now holds a fresh artifact, with the file it replaced.
struct Committed {
    dest: PathBuf,
    backup: Option<PathBuf>,
}

/// Moves every staged file into place. On the first failure, committed files
/// are removed, replaced files are restored and remaining staged files deleted.
fn commit(jobs: &[(Box<dyn Exporter>, &Path)], staged: &[PathBuf]) -> Result<Vec<PathBuf>, PlanError> {
    let mut done: Vec<Committed> = Vec::with_capacity(jobs.len());
    for ((sink, dest), staged_path) in jobs.iter().zip(staged) {
        match commit_one(dest, staged_path) {
            Ok(backup) => done.push(Committed {
                dest: dest.to_path_buf(),
                backup,
            }),
            Err(err) => {
                error!(
                    "could not move {} artifact into {}: {err}; rolling back",
                    sink.name(),
                    dest.display()
                );
                roll_back(&done);
                discard(staged);
                return Err(PlanError::Sink {
                    sink: sink.name(),
                    source: SinkWriteError::io(*dest, err),
                });
            }
        }
    }

    for backup in done.iter().filter_map(|c| c.backup.as_ref()) {
        remove_logged(backup);
    }
    Ok(done.into_iter().map(|c| c.dest).collect())
}

fn commit_one(dest: &Path, staged: &Path) -> io::Result<Option<PathBuf>> {
    if dest.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            "destination is a directory",
        ));
    }
    let backup = if dest.exists() {
        let backup = sibling_path(dest, "backup");
        fs::rename(dest, &backup)?;
        Some(backup)
    } else {
        None
    };
    if let Err(err) = fs::rename(staged, dest) {
        if let Some(backup) = &backup {
            restore(backup, dest);
        }
        return Err(err);
    }
    Ok(backup)
}

fn roll_back(done: &[Committed]) {
    for committed in done.iter().rev() {
        remove_logged(&committed.dest);
        if let Some(backup) = &committed.backup {
            restore(backup, &committed.dest);
        }
    }
}

fn restore(backup: &Path, dest: &Path) {
    if let Err(err) = fs::rename(backup, dest) {
        warn!(
            "could not restore {} from {}: {err}",
            dest.display(),
            backup.display()
        );
    }
}

/// Hidden sibling of `dest`, so the final rename stays on one filesystem.
fn staging_path(dest: &Path) -> PathBuf {
    sibling_path(dest, "partial")
}

/// `.{name}.{tag}`, followed by the extension of `dest` when it has one.
fn sibling_path(dest: &Path, tag: &str) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    // keep the extension last: the chart sink picks its backend from it
    match dest.extension() {
        Some(ext) => dest.with_file_name(format!(".{name}.{tag}.{}", ext.to_string_lossy())),
        None => dest.with_file_name(format!(".{name}.{tag}")),
    }
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        if path.exists() {
            remove_logged(path);
        }
    }
}

fn remove_logged(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!("could not remove {}: {err}", path.display());
    }
}
