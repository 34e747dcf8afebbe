//! Bounded-memory chunked reading of delimited records

use crate::error::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Upper bound on the capacity reserved up front for a chunk.
const MAX_PREALLOC: usize = 64 * 1024;

/// Yields the records of a header-first delimited stream in chunks of at
/// most `chunk_size` rows, in stream order.
pub struct ChunkReader<R> {
    reader: csv::Reader<R>,
    chunk_size: usize,
    rows_read: u64,
    failed: bool,
}

impl ChunkReader<File> {
    pub fn from_path(path: &Path, delimiter: u8, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_path(path)?;
        Ok(Self::with_reader(reader, chunk_size))
    }
}

impl<R: Read> ChunkReader<R> {
    pub fn from_reader(rdr: R, delimiter: u8, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        let reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(rdr);
        Ok(Self::with_reader(reader, chunk_size))
    }

    fn with_reader(reader: csv::Reader<R>, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size,
            rows_read: 0,
            failed: false,
        }
    }

    pub fn headers(&mut self) -> Result<&StringRecord> {
        Ok(self.reader.headers()?)
    }

    /// Position of `column` in the header row.
    pub fn column_index(&mut self, column: &str) -> Result<Option<usize>> {
        Ok(self.headers()?.iter().position(|name| name == column))
    }

    /// Data rows handed out so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Vec<StringRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut chunk = Vec::with_capacity(self.chunk_size.min(MAX_PREALLOC));
        while chunk.len() < self.chunk_size {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => chunk.push(record),
                Ok(false) => break,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }
        }

        if chunk.is_empty() {
            None
        } else {
            self.rows_read += chunk.len() as u64;
            Some(Ok(chunk))
        }
    }
}

/// Header and leading rows of a file.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read the header and the first `rows` records of `path`.
pub fn preview(path: &Path, rows: usize, delimiter: u8) -> Result<Preview> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .take(rows)
        .map(|record| -> Result<Vec<String>> {
            Ok(record?.iter().map(str::to_string).collect())
        })
        .collect::<Result<Vec<Vec<String>>>>()?;

    Ok(Preview { headers, rows })
}

impl Preview {
    /// Render as aligned text columns.
    pub fn to_table(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, field) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(field.chars().count());
                }
            }
        }

        let render = |fields: &[String]| {
            fields
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    let width = widths.get(i).copied().unwrap_or(0);
                    format!("{field:<width$}")
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![render(self.headers.as_slice())];
        lines.extend(self.rows.iter().map(|row| render(row.as_slice())));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DATA: &str = "id,ACTIVITY_TIME\n1,a\n2,b\n3,c\n4,d\n5,e\n";

    #[test]
    fn test_chunks_in_stream_order() {
        let reader = ChunkReader::from_reader(DATA.as_bytes(), b',', 2).unwrap();
        let chunks: Vec<Vec<StringRecord>> = reader.map(|c| c.unwrap()).collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[2].len(), 1);
        assert_eq!(&chunks[0][0][0], "1");
        assert_eq!(&chunks[2][0][0], "5");
    }

    #[test]
    fn test_chunk_larger_than_stream() {
        let mut reader = ChunkReader::from_reader(DATA.as_bytes(), b',', 1_000).unwrap();
        let chunk = reader.next().unwrap().unwrap();
        assert_eq!(chunk.len(), 5);
        assert!(reader.next().is_none());
        assert_eq!(reader.rows_read(), 5);
    }

    #[test]
    fn test_zero_chunk_size() {
        assert!(matches!(
            ChunkReader::from_reader(DATA.as_bytes(), b',', 0),
            Err(Error::InvalidChunkSize)
        ));
    }

    #[test]
    fn test_column_index() {
        let mut reader = ChunkReader::from_reader(DATA.as_bytes(), b',', 2).unwrap();
        assert_eq!(reader.column_index("ACTIVITY_TIME").unwrap(), Some(1));
        assert_eq!(reader.column_index("missing").unwrap(), None);
        // Reading the header must not consume data rows.
        assert_eq!(reader.next().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn test_ragged_row_stops_iteration() {
        let data = "a,b\n1,2\n3\n4,5\n";
        let mut reader = ChunkReader::from_reader(data.as_bytes(), b',', 10).unwrap();
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_preview() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DATA.as_bytes()).unwrap();

        let preview = preview(file.path(), 2, b',').unwrap();
        assert_eq!(preview.headers, vec!["id", "ACTIVITY_TIME"]);
        assert_eq!(preview.rows.len(), 2);

        let table = preview.to_table();
        assert!(table.starts_with("id  ACTIVITY_TIME"));
        assert_eq!(table.lines().count(), 3);
    }
}
