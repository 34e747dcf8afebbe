//! `bdp date-range`: earliest and latest timestamp of a large file.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

use super::print_json;
use crate::config::Settings;
use crate::scan::{find_date_range, preview, ScanOptions};

pub struct DateRangeParams {
    pub file: PathBuf,
    pub column: Option<String>,
    pub chunk_size: Option<usize>,
    pub prefix_len: Option<usize>,
    pub formats: Vec<String>,
    pub preview: Option<usize>,
}

impl DateRangeParams {
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(column) = &self.column {
            settings.scan.time_column = column.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            settings.scan.chunk_size = chunk_size;
        }
        if let Some(prefix_len) = self.prefix_len {
            settings.scan.prefix_len = prefix_len;
        }
        if !self.formats.is_empty() {
            settings.scan.formats = self.formats.clone();
        }
    }
}

pub fn run_date_range_command(params: DateRangeParams, mut settings: Settings, json: bool) -> Result<()> {
    params.apply_to(&mut settings);
    settings.validate()?;
    let options = ScanOptions::from_settings(&settings)?;
    debug!("Scan options: {:?}", options);

    let head = match params.preview {
        Some(rows) => Some(
            preview(&params.file, rows, options.delimiter)
                .with_context(|| format!("Failed to preview {}", params.file.display()))?,
        ),
        None => None,
    };

    if let (Some(head), false) = (&head, json) {
        println!("{}\n", head.to_table());
    }

    let report = find_date_range(&params.file, &options)
        .with_context(|| format!("Failed to scan {}", params.file.display()))?;

    if json {
        return print_json(&json!({ "preview": head, "report": report }));
    }

    println!(
        "First date is {} and the last date is {}",
        report.range.first, report.range.last
    );
    println!(
        "Scanned {} rows in {} chunks of up to {} rows ({:.2} seconds)",
        report.rows,
        report.chunks.len(),
        options.chunk_size,
        report.elapsed_secs
    );
    Ok(())
}
