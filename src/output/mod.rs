//! Output module for writing the dataset and crawl statistics
//!
//! This module handles:
//! - Writing finished author records as CSV
//! - Summarizing and printing crawl statistics

mod csv_output;
pub mod stats;
mod traits;

pub use csv_output::{CsvOutput, HEADER, STDOUT_PATH};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, RecordSink};
