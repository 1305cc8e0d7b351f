//! Author records and the per-document accumulators that build them
//!
//! - `IdentifierSet`: collaborator ids seen on one document, deduplicated
//! - `AuthorDraft`: the request-scoped record filled in while a document parses
//! - `AuthorRecord`: the finalized, immutable output row

mod author;
mod identifier_set;

pub use author::{AuthorDraft, AuthorRecord, COLLABORATOR_SEPARATOR};
pub use identifier_set::IdentifierSet;
