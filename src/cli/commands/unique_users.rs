//! `bdp unique-users`: total of per-file unique key counts.

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::print_json;
use crate::cli::args::RunMode;
use crate::config::Settings;
use crate::unique::{total_unique_parallel, total_unique_sequential, AggregateOptions, UniqueReport};

pub struct UniqueUsersParams {
    pub dir: PathBuf,
    pub column: Option<String>,
    pub workers: Option<usize>,
    pub extension: Option<String>,
    pub mode: RunMode,
    pub best_effort: bool,
}

impl UniqueUsersParams {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(column) = &self.column {
            settings.aggregate.column = column.clone();
        }
        if let Some(workers) = self.workers {
            settings.aggregate.workers = workers;
        }
        if let Some(extension) = &self.extension {
            settings.aggregate.extension = extension.clone();
        }
        if self.best_effort {
            settings.aggregate.best_effort = true;
        }
    }
}

pub fn run_unique_users_command(params: UniqueUsersParams, mut settings: Settings, json: bool) -> Result<()> {
    params.apply_to(&mut settings);
    settings.validate()?;
    let options = AggregateOptions::from_settings(&settings)?;
    let context = || format!("Failed to count unique values in {}", params.dir.display());

    let mut reports = Vec::new();
    if matches!(params.mode, RunMode::Parallel | RunMode::Both) {
        reports.push(total_unique_parallel(&params.dir, &options).with_context(context)?);
    }
    if matches!(params.mode, RunMode::Sequential | RunMode::Both) {
        reports.push(total_unique_sequential(&params.dir, &options).with_context(context)?);
    }

    if json {
        return print_json(&reports);
    }

    for report in &reports {
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &UniqueReport) {
    println!("{}", report.summary_line());
    println!(
        "  {} mode, {} files, column '{}'",
        report.strategy, report.files, report.column
    );
    for failure in &report.failures {
        println!("  skipped {}: {}", failure.path.display(), failure.error);
    }
}
