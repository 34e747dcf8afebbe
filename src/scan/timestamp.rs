//! Fixed-prefix timestamp parsing

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::{ScanSettings, DEFAULT_PREFIX_LEN};

/// Parses the leading `prefix_len` characters of a raw field.
///
/// Each format is tried first as a date-time and then as a bare date, which is
/// taken to start at midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampParser {
    prefix_len: usize,
    formats: Vec<String>,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX_LEN, vec!["%d-%b-%y".to_string()])
    }
}

impl TimestampParser {
    pub fn new(prefix_len: usize, formats: Vec<String>) -> Self {
        Self {
            prefix_len,
            formats,
        }
    }

    pub fn from_settings(settings: &ScanSettings) -> Self {
        Self::new(settings.prefix_len, settings.formats.clone())
    }

    /// The first `prefix_len` characters of `raw`, or all of it if shorter.
    pub fn prefix<'a>(&self, raw: &'a str) -> &'a str {
        match raw.char_indices().nth(self.prefix_len) {
            Some((end, _)) => &raw[..end],
            None => raw,
        }
    }

    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let prefix = self.prefix(raw).trim();
        self.formats.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(prefix, format)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(prefix, format)
                        .ok()
                        .map(|date| date.and_time(NaiveTime::MIN))
                })
        })
    }
}
