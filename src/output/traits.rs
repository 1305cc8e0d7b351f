//! Output sink trait and error types
//!
//! A sink receives the finished author records once the crawl has drained
//! and persists them in some tabular format.

use crate::record::AuthorRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for finished author records
pub trait RecordSink {
    /// Writes one record
    fn write_record(&mut self, record: &AuthorRecord) -> OutputResult<()>;

    /// Writes every record in order
    fn write_records(&mut self, records: &[AuthorRecord]) -> OutputResult<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flushes buffered output; the sink should not be used afterwards
    fn finish(&mut self) -> OutputResult<()>;
}
