//! Crawler module - traversal engine and orchestration
//!
//! This module contains the core crawling logic:
//! - HTTP transport for profile documents
//! - XML parsing and XPath extraction
//! - The work queue and traversal policy
//! - The callback-driven traversal engine
//! - The coordinator that turns profile documents into author records

mod coordinator;
mod engine;
mod error;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, Coordinator, CrawlOutcome, FailedDocument};
pub use engine::{EngineConfig, FieldMatch, TraversalEngine};
pub use error::{DocumentError, EngineError, VisitRejection};
pub use fetcher::{build_http_client, fetch_document, user_agent_string};
pub use frontier::{Request, TraversalPolicy, TraversalStats};
pub use parser::{compile_selector, extract, parse_document};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the data if a callback panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
