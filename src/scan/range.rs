//! Earliest/latest timestamp of a column, found chunk by chunk

use super::chunks::ChunkReader;
use super::timestamp::TimestampParser;
use crate::config::Settings;
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, trace};

/// An (earliest, latest) pair with `first <= last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

impl TimeRange {
    pub fn point(at: NaiveDateTime) -> Self {
        Self {
            first: at,
            last: at,
        }
    }

    pub fn include(&mut self, at: NaiveDateTime) {
        if at < self.first {
            self.first = at;
        }
        if at > self.last {
            self.last = at;
        }
    }

    pub fn merge(self, other: TimeRange) -> TimeRange {
        TimeRange {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        }
    }
}

/// Local extrema of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkExtrema {
    pub index: usize,
    pub rows: usize,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub path: PathBuf,
    pub column: String,
    pub range: TimeRange,
    pub rows: u64,
    pub chunks: Vec<ChunkExtrema>,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub column: String,
    pub chunk_size: usize,
    pub delimiter: u8,
    pub parser: TimestampParser,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            column: crate::config::DEFAULT_TIME_COLUMN.to_string(),
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
            delimiter: b',',
            parser: TimestampParser::default(),
        }
    }
}

impl ScanOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            column: settings.scan.time_column.clone(),
            chunk_size: settings.scan.chunk_size,
            delimiter: settings.delimiter_byte()?,
            parser: TimestampParser::from_settings(&settings.scan),
        })
    }
}

/// Find the earliest and latest timestamp of `options.column` in `path`.
pub fn find_date_range(path: &Path, options: &ScanOptions) -> Result<RangeReport> {
    let reader = ChunkReader::from_path(path, options.delimiter, options.chunk_size)?;
    scan_chunks(reader, path, options)
}

/// Same as [`find_date_range`] over any reader; `source` names it in errors.
pub fn find_date_range_in<R: Read>(
    rdr: R,
    source: &Path,
    options: &ScanOptions,
) -> Result<RangeReport> {
    let reader = ChunkReader::from_reader(rdr, options.delimiter, options.chunk_size)?;
    scan_chunks(reader, source, options)
}

fn scan_chunks<R: Read>(
    mut reader: ChunkReader<R>,
    source: &Path,
    options: &ScanOptions,
) -> Result<RangeReport> {
    let started = Instant::now();
    let column = reader
        .column_index(&options.column)?
        .ok_or_else(|| Error::MissingColumn {
            column: options.column.clone(),
            path: source.to_path_buf(),
        })?;

    info!(
        "Scanning {} for {} in chunks of {} rows",
        source.display(),
        options.column,
        options.chunk_size
    );

    let mut chunks = Vec::new();
    let mut next_row = 1u64;
    for (index, chunk) in reader.by_ref().enumerate() {
        let chunk = chunk?;
        let Some(range) = chunk_extrema(&chunk, column, next_row, &options.parser)? else {
            continue;
        };
        next_row += chunk.len() as u64;
        debug!(
            "Chunk {}: {} rows, {} .. {}",
            index,
            chunk.len(),
            range.first,
            range.last
        );
        chunks.push(ChunkExtrema {
            index,
            rows: chunk.len(),
            range,
        });
    }

    let range = chunks
        .iter()
        .map(|c| c.range)
        .reduce(TimeRange::merge)
        .ok_or_else(|| Error::EmptyStream {
            path: source.to_path_buf(),
        })?;

    let report = RangeReport {
        path: source.to_path_buf(),
        column: options.column.clone(),
        range,
        rows: reader.rows_read(),
        chunks,
        elapsed_secs: started.elapsed().as_secs_f64(),
    };
    info!(
        "First date is {} and the last date is {} ({} rows, {} chunks)",
        report.range.first,
        report.range.last,
        report.rows,
        report.chunks.len()
    );
    Ok(report)
}

/// Min and max timestamp of one chunk in a single pass; `None` for an empty
/// chunk.
///
/// `first_row` is the 1-based data row number of the chunk's first record and
/// is only used to locate parse failures.
pub fn chunk_extrema(
    chunk: &[StringRecord],
    column: usize,
    first_row: u64,
    parser: &TimestampParser,
) -> Result<Option<TimeRange>> {
    let mut range: Option<TimeRange> = None;

    for (offset, record) in chunk.iter().enumerate() {
        let row = first_row + offset as u64;
        let raw = record.get(column).unwrap_or_default();
        trace!("Row {}: {:?}", row, raw);
        let at = parser.parse(raw).ok_or_else(|| Error::TimestampParse {
            row,
            value: raw.to_string(),
        })?;

        match range.as_mut() {
            Some(range) => range.include(at),
            None => range = Some(TimeRange::point(at)),
        }
    }

    Ok(range)
}
