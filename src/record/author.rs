use crate::record::IdentifierSet;

/// Separator used when collaborator ids are flattened into one field
pub const COLLABORATOR_SEPARATOR: &str = ",";

/// One crawled author profile, as written to the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    /// Display name from the profile document
    pub name: String,

    /// The service's canonical identifier (pid)
    pub id: String,

    /// Co-author ids in first-discovery order; never contains `id`
    pub collaborator_ids: Vec<String>,
}

impl AuthorRecord {
    /// Collaborator ids joined into a single delimited field
    pub fn collaborators(&self) -> String {
        self.collaborator_ids.join(COLLABORATOR_SEPARATOR)
    }
}

/// Record under construction for one in-flight document
///
/// The traversal engine creates a fresh draft for every fetch, so fields
/// from concurrently parsed documents never mix.
#[derive(Debug, Clone, Default)]
pub struct AuthorDraft {
    pub name: Option<String>,
    pub id: Option<String>,
    pub collaborators: IdentifierSet,
}

impl AuthorDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when `candidate` is this draft's own id (if already known)
    pub fn is_self(&self, candidate: &str) -> bool {
        self.id.as_deref() == Some(candidate)
    }

    /// Converts the draft into an immutable record
    ///
    /// The author's own id is dropped from the collaborator set here rather
    /// than at insertion: the id attribute may be extracted after some
    /// collaborators were already recorded.
    pub fn finalize(self) -> AuthorRecord {
        let name = self.name.unwrap_or_default();
        let id = self.id.unwrap_or_default();

        let mut collaborators = self.collaborators;
        collaborators.remove(&id);

        AuthorRecord {
            name,
            id,
            collaborator_ids: collaborators.into_vec(),
        }
    }
}
