//! Sequential vs. parallel timings over geometrically growing inputs

use super::{evaluate_parallel, evaluate_sequential, PairingPolicy};
use crate::config::{Settings, MAX_EXPONENT};
use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Method {
    Sequential,
    Parallel,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Sequential => write!(f, "Sequential"),
            Method::Parallel => write!(f, "Parallel"),
        }
    }
}

/// One row of the timings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    #[serde(rename = "ListLen")]
    pub list_len: usize,
    #[serde(rename = "Type")]
    pub method: Method,
    /// Elapsed seconds
    #[serde(rename = "TimeTaken")]
    pub time_taken: f64,
}

#[derive(Debug, Clone)]
pub struct BenchmarkOptions {
    /// Sizes run are `10^0 ..= 10^(max_exponent - 1)`.
    pub max_exponent: u32,
    pub workers: usize,
    pub show_progress: bool,
}

impl BenchmarkOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_exponent: settings.benchmark.max_exponent,
            workers: settings.benchmark.workers,
            show_progress: false,
        }
    }
}

/// Time both evaluators for every list length `10^i`, `i < max_exponent`.
///
/// Each parallel measurement includes starting and stopping its own pool.
pub fn run_benchmark(options: &BenchmarkOptions) -> Result<Vec<TimingRecord>> {
    if options.max_exponent > MAX_EXPONENT {
        return Err(Error::Config(format!(
            "max_exponent must be at most {MAX_EXPONENT}, got {}",
            options.max_exponent
        )));
    }
    if options.workers == 0 {
        return Err(Error::InvalidWorkerCount);
    }

    let progress = create_progress_bar(options.max_exponent as u64, options.show_progress);
    let mut records = Vec::with_capacity(options.max_exponent as usize * 2);

    for exponent in 0..options.max_exponent {
        let list_len = 10usize.pow(exponent);
        progress.set_message(format!("list length {list_len}"));

        let xs: Vec<i64> = (0..list_len as i64).collect();
        let ys = xs.clone();

        let started = Instant::now();
        evaluate_sequential(&xs, &ys, PairingPolicy::Strict)?;
        let sequential = started.elapsed().as_secs_f64();
        records.push(TimingRecord {
            list_len,
            method: Method::Sequential,
            time_taken: sequential,
        });

        let started = Instant::now();
        let pool = WorkerPool::new(options.workers)?;
        evaluate_parallel(&pool, &xs, &ys, PairingPolicy::Strict)?;
        pool.shutdown();
        let parallel = started.elapsed().as_secs_f64();
        records.push(TimingRecord {
            list_len,
            method: Method::Parallel,
            time_taken: parallel,
        });

        debug!(
            "List length {}: sequential {:.6}s, parallel {:.6}s",
            list_len, sequential, parallel
        );
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!(
        "Benchmarked {} list lengths with {} workers",
        options.max_exponent, options.workers
    );
    Ok(records)
}

/// Write `records` as CSV with the header `ListLen,Type,TimeTaken`.
pub fn write_timings_csv(records: &[TimingRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!("Wrote {} timing rows to {}", records.len(), path.display());
    Ok(())
}

fn create_progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}
