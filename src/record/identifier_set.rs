use indexmap::IndexSet;

/// Collaborator identifiers discovered on a single document
///
/// Membership is deduplicated; iteration follows first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    ids: IndexSet<String>,
}

impl IdentifierSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an identifier, returning `true` if it was not seen before
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    /// Removes an identifier while keeping the order of the others
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Consumes the set, yielding identifiers in discovery order
    pub fn into_vec(self) -> Vec<String> {
        self.ids.into_iter().collect()
    }
}
