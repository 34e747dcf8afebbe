//! Chunked range finding over large delimited record files
//!
//! - `chunks` - bounded-memory record chunking and file preview
//! - `timestamp` - fixed-prefix timestamp parsing
//! - `range` - per-chunk extrema and their global reduction

pub mod chunks;
pub mod range;
pub mod timestamp;

pub use chunks::{preview, ChunkReader, Preview};
pub use range::{
    chunk_extrema, find_date_range, find_date_range_in, ChunkExtrema, RangeReport, ScanOptions,
    TimeRange,
};
pub use timestamp::TimestampParser;
