//! Distinct-value counting across a directory of record files
//!
//! Every file is counted on its own and yields a [`FileCount`]. Totals are the
//! sum of per-file counts: a value present in two files counts twice. Whether a
//! failing file aborts the total or is skipped is chosen with [`ReducePolicy`].
//!
//! Key values are trimmed and then compared as text: ` 7` and `7` are one
//! value, `07` and `7` are two.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Files directly inside `dir` whose extension is `extension`, sorted by name.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(OsStr::to_str) == Some(extension)
        {
            files.push(entry.into_path());
        }
    }

    debug!(
        "Found {} .{} files in {}",
        files.len(),
        extension,
        dir.display()
    );
    Ok(files)
}

/// Number of distinct non-empty values of `column` in one file.
pub fn count_unique(path: &Path, column: &str, delimiter: u8) -> Result<usize> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::Fields)
        .from_path(path)?;

    let index = reader
        .headers()?
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| Error::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        match record.get(index) {
            Some(value) if !value.is_empty() && !seen.contains(value) => {
                seen.insert(value.to_string());
            }
            _ => {}
        }
    }

    Ok(seen.len())
}

/// Outcome of counting one file.
#[derive(Debug)]
pub struct FileCount {
    pub path: PathBuf,
    pub outcome: Result<usize>,
}

pub fn count_files_sequential(files: &[PathBuf], column: &str, delimiter: u8) -> Vec<FileCount> {
    files
        .iter()
        .map(|path| FileCount {
            path: path.clone(),
            outcome: count_unique(path, column, delimiter),
        })
        .collect()
}

/// Count files in order and stop after the first one that fails.
pub fn count_files_until_failure(files: &[PathBuf], column: &str, delimiter: u8) -> Vec<FileCount> {
    let mut counts = Vec::with_capacity(files.len());
    for path in files {
        let outcome = count_unique(path, column, delimiter);
        let failed = outcome.is_err();
        counts.push(FileCount {
            path: path.clone(),
            outcome,
        });
        if failed {
            debug!("Stopping at {}", path.display());
            break;
        }
    }
    counts
}

/// Count every file on `pool`; blocks until all files are done.
///
/// Results are in the same order as `files`.
pub fn count_files_parallel(
    pool: &WorkerPool,
    files: &[PathBuf],
    column: &str,
    delimiter: u8,
) -> Result<Vec<FileCount>> {
    let column = column.to_string();
    pool.map(files.to_vec(), move |path| {
        let outcome = count_unique(&path, &column, delimiter);
        FileCount { path, outcome }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReducePolicy {
    /// The first failing file, in file order, fails the total.
    #[default]
    FailFast,
    /// Failing files are recorded and left out of the total.
    BestEffort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UniqueTotal {
    pub total: usize,
    pub files_counted: usize,
    pub failures: Vec<FileFailure>,
}

/// Sum per-file counts under `policy`.
pub fn reduce_counts(counts: Vec<FileCount>, policy: ReducePolicy) -> Result<UniqueTotal> {
    let mut summary = UniqueTotal::default();

    for FileCount { path, outcome } in counts {
        match outcome {
            Ok(count) => {
                debug!("{}: {} unique", path.display(), count);
                summary.total += count;
                summary.files_counted += 1;
            }
            Err(e) => match policy {
                ReducePolicy::FailFast => return Err(e.in_file(path)),
                ReducePolicy::BestEffort => {
                    warn!("Skipping {}: {}", path.display(), e);
                    summary.failures.push(FileFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            },
        }
    }

    Ok(summary)
}

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub column: String,
    pub extension: String,
    pub workers: usize,
    pub delimiter: u8,
    pub policy: ReducePolicy,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        let defaults = crate::config::AggregateSettings::default();
        Self {
            column: defaults.column,
            extension: defaults.extension,
            workers: defaults.workers,
            delimiter: b',',
            policy: ReducePolicy::default(),
        }
    }
}

impl AggregateOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            column: settings.aggregate.column.clone(),
            extension: settings.aggregate.extension.clone(),
            workers: settings.aggregate.workers,
            delimiter: settings.delimiter_byte()?,
            policy: if settings.aggregate.best_effort {
                ReducePolicy::BestEffort
            } else {
                ReducePolicy::FailFast
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    Sequential,
    Parallel,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Parallel => write!(f, "parallel"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UniqueReport {
    pub directory: PathBuf,
    pub column: String,
    pub strategy: Strategy,
    pub files: usize,
    pub total: usize,
    pub failures: Vec<FileFailure>,
    pub elapsed_secs: f64,
}

impl UniqueReport {
    pub fn summary_line(&self) -> String {
        format!(
            "Total unique users: {} in {:.2} seconds",
            format_thousands(self.total),
            self.elapsed_secs
        )
    }
}

/// Count one file at a time. Under [`ReducePolicy::FailFast`] no file after
/// the first failing one is opened.
pub fn total_unique_sequential(dir: &Path, options: &AggregateOptions) -> Result<UniqueReport> {
    let started = Instant::now();
    let files = discover_files(dir, &options.extension)?;
    let counts = match options.policy {
        ReducePolicy::FailFast => {
            count_files_until_failure(&files, &options.column, options.delimiter)
        }
        ReducePolicy::BestEffort => {
            count_files_sequential(&files, &options.column, options.delimiter)
        }
    };
    let summary = reduce_counts(counts, options.policy)?;
    Ok(finish_report(dir, options, Strategy::Sequential, files.len(), summary, started))
}

/// Count files on a pool of `options.workers` threads started for this call.
pub fn total_unique_parallel(dir: &Path, options: &AggregateOptions) -> Result<UniqueReport> {
    let started = Instant::now();
    let files = discover_files(dir, &options.extension)?;

    let pool = WorkerPool::new(options.workers)?;
    let counts = count_files_parallel(&pool, &files, &options.column, options.delimiter);
    pool.shutdown();

    let summary = reduce_counts(counts?, options.policy)?;
    Ok(finish_report(dir, options, Strategy::Parallel, files.len(), summary, started))
}

fn finish_report(
    dir: &Path,
    options: &AggregateOptions,
    strategy: Strategy,
    files: usize,
    summary: UniqueTotal,
    started: Instant,
) -> UniqueReport {
    let report = UniqueReport {
        directory: dir.to_path_buf(),
        column: options.column.clone(),
        strategy,
        files,
        total: summary.total,
        failures: summary.failures,
        elapsed_secs: started.elapsed().as_secs_f64(),
    };
    info!("{} ({}, {} files)", report.summary_line(), strategy, files);
    report
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_count_unique_skips_empty_values() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.csv", "user_id,cell\n1,x\n2,y\n1,z\n,w\n3,x\n");
        assert_eq!(count_unique(&path, "user_id", b',').unwrap(), 3);
        assert_eq!(count_unique(&path, "cell", b',').unwrap(), 4);
    }

    #[test]
    fn test_count_unique_trims_but_keeps_text_identity() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.csv", "user_id\n7\n 7\n7 \n07\n  \n");
        // "7", " 7" and "7 " are one value; "07" is another; blanks are skipped.
        assert_eq!(count_unique(&path, "user_id", b',').unwrap(), 2);
    }

    #[test]
    fn test_until_failure_stops_at_first_bad_file() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(&dir, "a.csv", "user_id\n1\n2\n"),
            write(&dir, "b.csv", "caller\n1\n"),
            write(&dir, "c.csv", "user_id\n3\n"),
        ];

        let counts = count_files_until_failure(&files, "user_id", b',');
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].outcome.as_ref().unwrap(), &2);
        assert!(counts[1].outcome.is_err());

        assert_eq!(count_files_sequential(&files, "user_id", b',').len(), 3);
    }

    #[test]
    fn test_count_unique_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.csv", "caller\n1\n");
        assert!(matches!(
            count_unique(&path, "user_id", b','),
            Err(Error::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.csv", "user_id\n1\n");
        write(&dir, "a.csv", "user_id\n1\n");
        write(&dir, "notes.txt", "hello");
        write(&dir, "c.CSV", "user_id\n1\n");
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = discover_files(dir.path(), "csv").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
        assert_eq!(discover_files(dir.path(), ".csv").unwrap(), files);
    }

    #[test]
    fn test_discover_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            discover_files(&dir.path().join("absent"), "csv"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_reduce_fail_fast_names_file() {
        let counts = vec![
            FileCount {
                path: PathBuf::from("a.csv"),
                outcome: Ok(2),
            },
            FileCount {
                path: PathBuf::from("b.csv"),
                outcome: Err(Error::MissingColumn {
                    column: "user_id".to_string(),
                    path: PathBuf::from("b.csv"),
                }),
            },
        ];
        match reduce_counts(counts, ReducePolicy::FailFast).unwrap_err() {
            Error::File { path, .. } => assert_eq!(path, PathBuf::from("b.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reduce_best_effort_skips_failures() {
        let counts = vec![
            FileCount {
                path: PathBuf::from("a.csv"),
                outcome: Ok(2),
            },
            FileCount {
                path: PathBuf::from("b.csv"),
                outcome: Err(Error::MissingColumn {
                    column: "user_id".to_string(),
                    path: PathBuf::from("b.csv"),
                }),
            },
            FileCount {
                path: PathBuf::from("c.csv"),
                outcome: Ok(5),
            },
        ];
        let summary = reduce_counts(counts, ReducePolicy::BestEffort).unwrap();
        assert_eq!(summary.total, 7);
        assert_eq!(summary.files_counted, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, PathBuf::from("b.csv"));
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_summary_line() {
        let report = UniqueReport {
            directory: PathBuf::from("cdrs"),
            column: "user_id".to_string(),
            strategy: Strategy::Parallel,
            files: 3,
            total: 12_345,
            failures: vec![],
            elapsed_secs: 1.234,
        };
        assert_eq!(
            report.summary_line(),
            "Total unique users: 12,345 in 1.23 seconds"
        );
    }
}
