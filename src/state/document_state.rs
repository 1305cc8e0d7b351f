/// Document state definitions for tracking crawl progress
///
/// This module defines all states a fetched document can be in while the
/// traversal engine processes it.
use crate::RippleError;
use std::fmt;

/// Represents the current state of a document in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    // ===== Active States =====
    /// Document has been enqueued but no worker has picked it up yet
    Pending,

    /// Document is currently being fetched
    Fetching,

    /// Document body is being parsed and extraction callbacks are running
    Parsing,

    // ===== Terminal States =====
    /// All extraction callbacks ran and the document-done event fired
    Done,

    /// Fetch or parse failed; the document never reaches `Done`
    Failed,
}

impl DocumentState {
    /// Returns true if this is a terminal state (no further processing happens)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this is an active state (document may still be processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// `Parsing -> Done` is the only edge that finalizes a record. There is no
    /// cancellation: once a document is `Pending` it ends in `Done` or `Failed`.
    pub fn can_transition_to(&self, next: DocumentState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Parsing)
                | (Self::Fetching, Self::Failed)
                | (Self::Parsing, Self::Done)
                | (Self::Parsing, Self::Failed)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn advance(self, next: DocumentState) -> Result<DocumentState, RippleError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(RippleError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase label used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
