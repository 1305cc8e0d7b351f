//! End-of-run crawl statistics
//!
//! This module summarizes a finished crawl and prints the summary to
//! stdout.

use crate::crawler::{CrawlOutcome, FailedDocument};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Rows in the dataset
    pub records: usize,

    /// Distinct author ids among the rows (profiles may be fetched twice)
    pub unique_authors: usize,

    /// Sum of collaborator ids over all rows
    pub collaborator_links: usize,

    /// Requests accepted into the queue
    pub enqueued: usize,

    /// Documents that failed to fetch or parse
    pub failed: usize,

    /// Visits refused by the traversal policy
    pub rejected: usize,

    /// Failed documents with their error messages
    pub failures: Vec<FailedDocument>,
}

impl CrawlStatistics {
    pub fn from_outcome(outcome: &CrawlOutcome) -> Self {
        let unique_authors = outcome
            .records
            .iter()
            .map(|record| record.id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let collaborator_links = outcome
            .records
            .iter()
            .map(|record| record.collaborator_ids.len())
            .sum();

        Self {
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            records: outcome.records.len(),
            unique_authors,
            collaborator_links,
            enqueued: outcome.stats.enqueued,
            failed: outcome.stats.failed,
            rejected: outcome.stats.rejected,
            failures: outcome.failures.clone(),
        }
    }

    /// Whole seconds between start and finish
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Share of fetched documents that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.records + self.failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.records as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    println!("  Finished: {}", stats.finished_at.to_rfc3339());
    println!("  Duration: {}s", stats.duration_seconds());
    println!();

    println!("Overview:");
    println!("  Records written: {}", stats.records);
    println!("  Unique authors: {}", stats.unique_authors);
    println!("  Collaborator links: {}", stats.collaborator_links);
    println!("  Documents queued: {}", stats.enqueued);
    println!("  Visits not followed: {}", stats.rejected);
    println!();

    if !stats.failures.is_empty() {
        println!("Failed Documents ({}):", stats.failures.len());
        for failure in &stats.failures {
            println!(
                "  - {} (depth {}): {}",
                failure.url, failure.depth, failure.error
            );
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} documents processed)",
        stats.success_rate(),
        stats.records,
        stats.records + stats.failed
    );
}
