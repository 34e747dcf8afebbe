//! CLI argument structures
//!
//! This module defines the command-line interface of bdp: the main CLI
//! structure and all subcommand definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Chunked scans and parallel aggregation over large CSV files
#[derive(Parser)]
#[command(name = "bdp")]
#[command(about = "bdp - Chunked scans and parallel aggregation over large CSV files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the earliest and latest timestamp of a column by reading in chunks
    #[command(name = "date-range")]
    DateRange {
        /// Delimited file with a header row
        file: PathBuf,

        /// Name of the timestamp column
        #[arg(long)]
        column: Option<String>,

        /// Records per chunk
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Leading characters of the field to parse
        #[arg(long)]
        prefix_len: Option<usize>,

        /// Timestamp format (chrono syntax); repeat to try several in order
        #[arg(long = "format", value_name = "FORMAT")]
        formats: Vec<String>,

        /// Print the header and first ROWS records before scanning
        #[arg(long, value_name = "ROWS")]
        preview: Option<usize>,
    },

    /// Time sequential vs. parallel evaluation of 2x^2 + a - 1
    #[command(name = "quadratic")]
    Quadratic {
        /// Run list lengths 10^0 up to 10^(N-1); N is at most 10
        #[arg(short = 'n', long, value_name = "N")]
        max_exponent: Option<u32>,

        /// Number of parallel workers
        #[arg(long)]
        workers: Option<usize>,

        /// Where to write the timing chart (SVG)
        #[arg(long)]
        out_plot: Option<PathBuf>,

        /// Where to write the timing table (CSV)
        #[arg(long)]
        out_csv: Option<PathBuf>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Sum per-file unique counts of a key column over a directory of files
    #[command(name = "unique-users")]
    UniqueUsers {
        /// Directory holding the record files
        dir: PathBuf,

        /// Name of the key column
        #[arg(long)]
        column: Option<String>,

        /// Number of parallel workers
        #[arg(long)]
        workers: Option<usize>,

        /// File extension to include
        #[arg(long)]
        extension: Option<String>,

        /// Which implementation to run
        #[arg(long, value_enum, default_value = "both")]
        mode: RunMode,

        /// Skip unreadable files instead of failing the total
        #[arg(long)]
        best_effort: bool,
    },

    /// Print the effective configuration as TOML
    #[command(name = "config")]
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Sequential,
    Parallel,
    Both,
}
