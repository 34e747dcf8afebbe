//! # bdp
//!
//! Chunked scans and worker-pool aggregation over large delimited record files.
//!
//! ## Usage
//!
//! ```bash
//! bdp date-range activity_log_raw.csv [--chunk-size N] [--preview ROWS]
//! bdp quadratic [-n 9] [--workers 4] [--out-plot test_plot.svg] [--out-csv test_csv.csv]
//! bdp unique-users simulated_cdrs/ [--workers 12] [--mode both]
//! ```
//!
//! ## Modules
//!
//! - `cli` - Argument parsing and command handlers
//! - `config` - Layered configuration (defaults, TOML file, `BDP_*` environment)
//! - `error` - Library error type
//! - `pool` - Fixed-size worker pool with an explicit per-call lifecycle
//! - `quadratic` - Sequential and parallel evaluation of `2x² + a − 1`, with a timing benchmark
//! - `scan` - Chunked earliest/latest timestamp search
//! - `unique` - Per-file distinct counts summed over a directory
pub mod cli;
pub mod config;
pub mod error;
pub mod pool;
pub mod quadratic;
pub mod scan;
pub mod unique;

pub use error::{Error, Result};
