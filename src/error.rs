use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("Could not parse timestamp on row {row}: {value:?}")]
    TimestampParse { row: u64, value: String },

    #[error("No records found in {}", path.display())]
    EmptyStream { path: PathBuf },

    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("2x² + a − 1 overflows i64 for x = {x}, a = {a}")]
    Overflow { x: i64, a: i64 },

    #[error("Input lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Failed to start worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Failed to process {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("Directory scan error: {0}")]
    DirectoryScan(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the file that produced this error.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Error::File {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
