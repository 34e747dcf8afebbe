//! Layered configuration for bdp
//!
//! Settings are resolved from built-in defaults, an optional TOML file, `BDP_*`
//! environment variables and finally command-line flags (applied by the CLI).

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_TIME_COLUMN: &str = "ACTIVITY_TIME";
pub const DEFAULT_USER_COLUMN: &str = "user_id";
pub const DEFAULT_CHUNK_SIZE: usize = 600_000;
pub const DEFAULT_PREFIX_LEN: usize = 9;
/// Largest benchmark exponent; list lengths run up to `10^(MAX_EXPONENT - 1)`.
pub const MAX_EXPONENT: u32 = 10;

/// Location of the per-user config file, if a home directory can be resolved
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bdp").map(|dirs| dirs.config_dir().join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub delimiter: char,
    pub scan: ScanSettings,
    pub aggregate: AggregateSettings,
    pub benchmark: BenchmarkSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub time_column: String,
    pub chunk_size: usize,
    pub prefix_len: usize,
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateSettings {
    pub column: String,
    pub extension: String,
    pub workers: usize,
    pub best_effort: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkSettings {
    pub max_exponent: u32,
    pub workers: usize,
    pub out_plot: PathBuf,
    pub out_csv: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            delimiter: ',',
            scan: ScanSettings::default(),
            aggregate: AggregateSettings::default(),
            benchmark: BenchmarkSettings::default(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            prefix_len: DEFAULT_PREFIX_LEN,
            formats: vec!["%d-%b-%y".to_string()],
        }
    }
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            column: DEFAULT_USER_COLUMN.to_string(),
            extension: "csv".to_string(),
            workers: 12,
            best_effort: false,
        }
    }
}

impl Default for BenchmarkSettings {
    fn default() -> Self {
        Self {
            max_exponent: 9,
            workers: 4,
            out_plot: PathBuf::from("test_plot.svg"),
            out_csv: PathBuf::from("test_csv.csv"),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the global config file when no path
    /// is given and one exists, then apply environment overrides.
    ///
    /// The result is not validated: command-line flags still apply on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match global_config_path().filter(|p| p.exists()) {
                Some(global) => Self::from_file(&global)?,
                None => Self::default(),
            },
        };

        settings.merge_env_vars();
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply `BDP_*` overrides using `lookup` to resolve variables.
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("BDP_LOG_LEVEL") {
            self.log_level = level;
        }

        if let Some(column) = lookup("BDP_TIME_COLUMN") {
            self.scan.time_column = column;
        }

        if let Some(column) = lookup("BDP_USER_COLUMN") {
            self.aggregate.column = column;
        }

        if let Some(value) = lookup("BDP_DELIMITER") {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => self.delimiter = c,
                _ => warn!("Ignoring BDP_DELIMITER={value:?}: expected a single character"),
            }
        }

        parse_env_number(&lookup, "BDP_CHUNK_SIZE", &mut self.scan.chunk_size);
        parse_env_number(&lookup, "BDP_WORKERS", &mut self.aggregate.workers);
        parse_env_number(&lookup, "BDP_BENCH_WORKERS", &mut self.benchmark.workers);
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        if self.aggregate.workers == 0 || self.benchmark.workers == 0 {
            return Err(Error::InvalidWorkerCount);
        }
        if self.scan.prefix_len == 0 {
            return Err(Error::Config(
                "scan.prefix_len must be at least 1".to_string(),
            ));
        }
        if self.benchmark.max_exponent > MAX_EXPONENT {
            return Err(Error::Config(format!(
                "benchmark.max_exponent must be at most {MAX_EXPONENT}, got {}",
                self.benchmark.max_exponent
            )));
        }
        if self.scan.formats.is_empty() {
            return Err(Error::Config(
                "scan.formats must list at least one timestamp format".to_string(),
            ));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(Error::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_env_number<F>(lookup: &F, key: &str, target: &mut usize)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<usize>() {
            Ok(value) => *target = value,
            Err(_) => warn!("Ignoring {key}={raw:?}: not a non-negative integer"),
        }
    }
}
