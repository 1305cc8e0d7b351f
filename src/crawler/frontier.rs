//! Work queue and traversal policy
//!
//! This module handles:
//! - Admission of discovered URLs (parse, allow-list, depth bound, revisit)
//! - The unbounded queue shared by the worker pool
//! - The pending-work counter that tells workers when the crawl is over
//! - Traversal counters

use crate::crawler::{lock, VisitRejection};
use crate::url::{extract_domain, is_domain_allowed, normalize_url};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use url::Url;

/// A profile URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The URL to fetch
    pub url: Url,

    /// Discovery hops from the seed (seed = 0)
    pub depth: u32,
}

/// Rules a URL must pass before it is queued
#[derive(Debug, Clone)]
pub struct TraversalPolicy {
    /// Host patterns that may be fetched; empty admits any host
    pub allowed_domains: Vec<String>,

    /// Deepest discovery hop that is still fetched
    pub max_depth: u32,

    /// When false, a URL is queued at most once per run
    pub allow_revisit: bool,
}

impl TraversalPolicy {
    /// Checks everything that does not depend on run history
    pub fn admit(&self, raw: &str, depth: u32) -> Result<Url, VisitRejection> {
        let url = normalize_url(raw).map_err(|e| VisitRejection::InvalidUrl(e.to_string()))?;

        let domain = extract_domain(&url).unwrap_or_default();
        if !self.allowed_domains.is_empty() && !is_domain_allowed(&domain, &self.allowed_domains) {
            return Err(VisitRejection::DomainNotAllowed(domain));
        }

        if depth > self.max_depth {
            return Err(VisitRejection::DepthExceeded {
                depth,
                max_depth: self.max_depth,
            });
        }

        Ok(url)
    }
}

/// Counts of what happened during a traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Requests accepted into the queue
    pub enqueued: usize,

    /// Documents that reached the document-done event
    pub completed: usize,

    /// Documents that failed to fetch or parse
    pub failed: usize,

    /// Visits refused by the traversal policy
    pub rejected: usize,

    /// Wall time spent in `run`
    pub elapsed: Duration,
}

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct TraversalCounters {
    enqueued: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    rejected: AtomicUsize,
}

impl TraversalCounters {
    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, elapsed: Duration) -> TraversalStats {
        TraversalStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// The crawl frontier
///
/// `pending` counts requests that were queued but whose processing has not
/// finished. It is incremented before a request becomes visible to workers
/// and decremented only after that document's callbacks have returned, so
/// every follow-up visit is counted before its parent is released. When it
/// drops to zero nothing can enqueue anymore and the `finished` flag flips.
#[derive(Debug)]
pub struct Frontier {
    policy: TraversalPolicy,
    sender: mpsc::UnboundedSender<Request>,
    visited: Mutex<HashSet<String>>,
    pending: AtomicUsize,
    finished: watch::Sender<bool>,
    counters: TraversalCounters,
}

impl Frontier {
    pub fn new(policy: TraversalPolicy) -> (Self, mpsc::UnboundedReceiver<Request>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (finished, _) = watch::channel(false);

        let frontier = Self {
            policy,
            sender,
            visited: Mutex::new(HashSet::new()),
            pending: AtomicUsize::new(0),
            finished,
            counters: TraversalCounters::default(),
        };

        (frontier, receiver)
    }

    /// Queues `raw` at `depth` if the policy admits it
    pub fn enqueue(&self, raw: &str, depth: u32) -> Result<(), VisitRejection> {
        let result = self.try_enqueue(raw, depth);
        if result.is_err() {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    fn try_enqueue(&self, raw: &str, depth: u32) -> Result<(), VisitRejection> {
        let url = self.policy.admit(raw, depth)?;

        if !self.policy.allow_revisit && !lock(&self.visited).insert(url.as_str().to_string()) {
            return Err(VisitRejection::AlreadyVisited);
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(Request { url, depth }).is_err() {
            self.complete();
            return Err(VisitRejection::Closed);
        }

        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Marks one queued request as finished
    ///
    /// Returns true when this was the last outstanding request.
    pub fn complete(&self) -> bool {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.finished.send_replace(true);
            true
        } else {
            false
        }
    }

    /// Number of queued or in-flight requests
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Receiver that observes `true` once all work has drained
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.finished.subscribe()
    }

    pub fn counters(&self) -> &TraversalCounters {
        &self.counters
    }
}
