//! State module for tracking document progress
//!
//! Every fetched document walks a small lifecycle:
//! `Pending -> Fetching -> Parsing -> Done`, or ends in `Failed` when the
//! fetch or the parse goes wrong.

mod document_state;

pub use document_state::DocumentState;
