//! Error types raised by the traversal engine

use thiserror::Error;

/// Setup-time engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Per-document failures, reported through the engine's error event
///
/// None of these abort the crawl; the failing document simply never
/// reaches the document-done event.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("Redirect to '{location}' leaves the allow-list")]
    RedirectBlocked { location: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("XPath evaluation failed for '{selector}': {message}")]
    XPath { selector: String, message: String },
}

/// Policy-guard outcomes of `visit`
///
/// A rejected visit is a silent no-op for the crawl: it is returned to the
/// caller but never fires the error event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitRejection {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Domain '{0}' is not in the allow-list")]
    DomainNotAllowed(String),

    #[error("Depth {depth} exceeds max depth {max_depth}")]
    DepthExceeded { depth: u32, max_depth: u32 },

    #[error("Already visited in this run")]
    AlreadyVisited,

    #[error("Work queue is closed")]
    Closed,
}
