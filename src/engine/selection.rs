use crate::store::{DocumentId, DocumentStore, StoreError};
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no document ids given")]
    EmptySelection,
    #[error("none of the requested documents exist")]
    NoMatch,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The set of documents subsequent queries are narrowed to. Replaced
/// wholesale on every `select`; last writer wins.
#[derive(Debug, Default)]
pub struct SelectionFilter {
    selected: RwLock<HashSet<DocumentId>>,
}

impl SelectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with the requested ids that exist in `store`.
    /// Returns the stored selection in ascending order. On error the
    /// previous selection is left untouched.
    pub fn select(
        &self,
        ids: &[DocumentId],
        store: &dyn DocumentStore,
    ) -> Result<Vec<DocumentId>, SelectionError> {
        if ids.is_empty() {
            return Err(SelectionError::EmptySelection);
        }
        let existing = store.existing_ids(ids)?;
        if existing.is_empty() {
            return Err(SelectionError::NoMatch);
        }
        *self.selected.write() = existing.iter().copied().collect();
        Ok(existing)
    }

    pub fn clear(&self) {
        self.selected.write().clear();
    }

    pub fn is_active(&self) -> bool {
        !self.selected.read().is_empty()
    }

    /// A copy of the current selection, so a query works against one
    /// consistent view even if `select` runs concurrently.
    pub fn snapshot(&self) -> HashSet<DocumentId> {
        self.selected.read().clone()
    }

    pub fn selected(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.selected.read().iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
