//! Crawler coordinator - binds the traversal engine to author records
//!
//! This module contains the crawl orchestration:
//! - Building the HTTP client and the engine from configuration
//! - Registering the name, identifier and collaborator extraction callbacks
//! - Finalizing one `AuthorRecord` per completed profile document (a
//!   document without an id attribute takes the id from its URL)
//! - Collecting per-document failures
//! - Writing the finished dataset

use crate::config::Config;
use crate::crawler::{
    build_http_client, lock, EngineConfig, Request, TraversalEngine, TraversalStats,
};
use crate::output::{CsvOutput, RecordSink};
use crate::record::{AuthorDraft, AuthorRecord};
use crate::url::{identifier_from_profile_url, normalize_url, profile_url};
use crate::{ConfigError, RippleError};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use url::Url;

/// A profile document that could not be fetched or parsed
#[derive(Debug, Clone)]
pub struct FailedDocument {
    pub url: Url,
    pub depth: u32,
    pub error: String,
}

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// One record per completed document, in completion order
    pub records: Vec<AuthorRecord>,

    /// Documents that reached the error event
    pub failures: Vec<FailedDocument>,

    pub stats: TraversalStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    engine: TraversalEngine<AuthorDraft>,
    records: Arc<Mutex<Vec<AuthorRecord>>>,
    failures: Arc<Mutex<Vec<FailedDocument>>>,
}

impl Coordinator {
    /// Creates a coordinator with every seed already queued
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(RippleError)` - No seeds, a bad base URL, a bad selector, or the
    ///   HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, RippleError> {
        if config.source.seeds.is_empty() {
            return Err(ConfigError::Validation("no seed URLs configured".to_string()).into());
        }

        let base = normalize_url(&config.source.base_url)?;
        let allowed_domains = config.source.effective_allowed_domains();
        let client = build_http_client(
            &config.user_agent,
            config.crawler.request_timeout(),
            allowed_domains.clone(),
        )?;

        let mut engine: TraversalEngine<AuthorDraft> = TraversalEngine::new(
            EngineConfig::from_crawler(&config.crawler, allowed_domains),
            client,
        );

        let records = Arc::new(Mutex::new(Vec::new()));
        let failures = Arc::new(Mutex::new(Vec::new()));

        engine.on_request_start(|request: &Request| {
            tracing::info!("Visiting {} (depth {})", request.url, request.depth);
        });

        engine.on_field(&config.selectors.name, |field| {
            let name = field.text().to_string();
            field.context_mut().name = Some(name);
        })?;

        engine.on_field(&config.selectors.id, |field| {
            let id = field.text().to_string();
            field.context_mut().id = Some(id);
        })?;

        engine.on_field(&config.selectors.collaborator, move |field| {
            let id = field.text();
            let draft = field.context_mut();
            if !draft.collaborators.insert(id) || draft.is_self(id) {
                return;
            }

            match profile_url(&base, id) {
                Ok(url) => {
                    if let Err(rejection) = field.visit(url.as_str()) {
                        tracing::debug!("Not following {}: {}", url, rejection);
                    }
                }
                Err(e) => tracing::debug!("Skipping collaborator on {}: {}", field.url(), e),
            }
        })?;

        let finished = Arc::clone(&records);
        engine.on_document_done(move |request, draft| {
            if draft.id.is_none() {
                draft.id = identifier_from_profile_url(&request.url);
            }
            let record = std::mem::take(draft).finalize();
            tracing::debug!(
                "Finalized {} with {} collaborators from {}",
                record.id,
                record.collaborator_ids.len(),
                request.url
            );
            lock(&finished).push(record);
        });

        let failed = Arc::clone(&failures);
        engine.on_error(move |request, error| {
            tracing::warn!("Failed to process {}: {}", request.url, error);
            lock(&failed).push(FailedDocument {
                url: request.url.clone(),
                depth: request.depth,
                error: error.to_string(),
            });
        });

        for seed in &config.source.seeds {
            engine.visit(seed).map_err(|rejection| {
                ConfigError::Validation(format!("Seed URL '{}' rejected: {}", seed, rejection))
            })?;
        }

        tracing::info!("Seeded frontier with {} URLs", config.source.seeds.len());

        Ok(Self {
            engine,
            records,
            failures,
        })
    }

    /// Runs the crawl to completion
    ///
    /// Per-document failures are collected in the outcome; they never abort
    /// the run.
    pub async fn run(self) -> CrawlOutcome {
        let started_at = Utc::now();
        let stats = self.engine.run().await;
        let finished_at = Utc::now();

        let records = std::mem::take(&mut *lock(&self.records));
        let failures = std::mem::take(&mut *lock(&self.failures));

        tracing::info!(
            "Crawl completed: {} records, {} failures in {:?}",
            records.len(),
            failures.len(),
            stats.elapsed
        );

        CrawlOutcome {
            records,
            failures,
            stats,
            started_at,
            finished_at,
        }
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the coordinator and queue the seeds
/// 2. Open the dataset file (before any fetch, so a bad path fails fast)
/// 3. Crawl until the work queue drains
/// 4. Write every finished record
///
/// # Arguments
///
/// * `config` - The validated crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished and the dataset was written
/// * `Err(RippleError)` - Setup failed, or the dataset could not be written
///
/// # Example
///
/// ```no_run
/// use coauthor_ripple::config::load_config;
/// use coauthor_ripple::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let outcome = run_crawl(config).await?;
/// println!("{} authors", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlOutcome, RippleError> {
    let output = config.output.clone();
    let coordinator = Coordinator::new(config)?;
    let mut sink = CsvOutput::open(&output)?;

    let outcome = coordinator.run().await;

    sink.write_records(&outcome.records)?;
    sink.finish()?;
    tracing::info!(
        "Wrote {} records to {}",
        outcome.records.len(),
        output.csv_path
    );

    Ok(outcome)
}
