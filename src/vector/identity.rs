use super::VectorError;
use crate::store::DocumentId;

/// Position-to-identifier table aligned 1:1 with a `FlatIndex`.
///
/// Alignment is a caller contract: `rebuild` must be given identifiers in the
/// same order as the vectors handed to the index, and every `append` must
/// follow exactly one index append.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityMap {
    ids: Vec<DocumentId>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, ids: Vec<DocumentId>) {
        self.ids = ids;
    }

    pub fn append(&mut self, id: DocumentId) {
        self.ids.push(id);
    }

    pub fn resolve(&self, position: usize) -> Result<DocumentId, VectorError> {
        self.ids
            .get(position)
            .copied()
            .ok_or(VectorError::OutOfRange {
                position,
                len: self.ids.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[DocumentId] {
        &self.ids
    }
}
