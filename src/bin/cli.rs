use anyhow::Context;
use clap::{Parser, Subcommand};
use climbing_plan::export::{ChartOptions, load_frame};
use climbing_plan::{
    ExportMode, OutputPaths, PlanConfig, RunOptions, build_schedule, generate,
    load_config_from_json, save_config_to_json,
};
use env_logger::Env;
use log::info;
use polars::prelude::{AnyValue, DataFrame};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Climbing training plan generator: calendar, spreadsheet and load chart", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the calendar, spreadsheet, chart and load summary
    Generate {
        /// JSON plan configuration (defaults to the built-in plan)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Run the sinks in parallel
        #[arg(long)]
        parallel: bool,
        /// Skip session codes missing from the catalog instead of failing
        #[arg(long)]
        skip_unknown: bool,
        /// TrueType font used for chart labels
        #[arg(long)]
        font: Option<PathBuf>,
    },
    /// Print the weekly load table
    Summary {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the built-in configuration as JSON, as a starting point for edits
    DumpConfig {
        #[arg(long, default_value = "climbing_plan.json")]
        out: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PlanConfig> {
    match path {
        Some(path) => {
            info!("loading plan configuration from {}", path.display());
            Ok(load_config_from_json(path)?)
        }
        None => Ok(PlanConfig::default()),
    }
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        cells.push(
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect(),
        );
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (value, width) in values.iter().zip(&widths) {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(width.saturating_sub(value.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = Vec::with_capacity(cells.len() + 4);
    out.push(sep.clone());
    out.push(render_row(&col_names));
    out.push(sep.clone());
    for row in &cells {
        out.push(render_row(row));
    }
    out.push(sep);
    out.join("\n")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            config,
            out_dir,
            parallel,
            skip_unknown,
            font,
        } => {
            let mut config = load_config(config.as_deref())?;
            config.skip_unknown_sessions |= skip_unknown;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;

            let options = RunOptions {
                mode: if parallel {
                    ExportMode::Parallel
                } else {
                    ExportMode::Sequential
                },
                chart: ChartOptions {
                    font_path: font,
                    ..ChartOptions::default()
                },
                generated_at: None,
            };
            let report = generate(&config, &OutputPaths::in_dir(&out_dir), &options)
                .context("plan generation failed")?;
            for path in &report.written {
                println!("saved: {}", path.display());
            }
            println!(
                "{} sessions over {} weeks, {:.1} hours total",
                report.schedule.instances.len(),
                report.schedule.weeks.len(),
                report.schedule.total_hours()
            );
        }
        Commands::Summary { config } => {
            let config = load_config(config.as_deref())?;
            let schedule = build_schedule(&config).context("plan is invalid")?;
            let frame = load_frame(&schedule.week_loads, &schedule.weeks)?;
            println!("{}", render_df_as_text_table(&frame));
        }
        Commands::DumpConfig { out } => {
            save_config_to_json(&PlanConfig::default(), &out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("configuration saved: {}", out.display());
        }
    }
    Ok(())
}
