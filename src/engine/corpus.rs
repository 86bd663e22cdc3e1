use crate::store::DocumentId;
use crate::vector::{codec, FlatIndex, IdentityMap, Neighbor, VectorError, VectorIndex};
use serde::Serialize;

/// Outcome of rebuilding the index from the document store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// The vector index together with its identity map. The pair is only ever
/// mutated as a unit so `index.len() == ids.len()` holds between operations.
#[derive(Clone, Debug)]
pub struct IndexedCorpus {
    index: FlatIndex,
    ids: IdentityMap,
}

impl IndexedCorpus {
    pub fn empty(dim: usize, parallel_search_min: usize) -> Result<Self, VectorError> {
        Ok(Self {
            index: FlatIndex::new(dim)?.with_parallel_search_min(parallel_search_min),
            ids: IdentityMap::new(),
        })
    }

    /// Decode every stored embedding and build a fresh pair off to the side.
    /// Rows that fail to decode are logged and left out together with their
    /// identifier, so alignment is kept.
    pub fn build(
        dim: usize,
        parallel_search_min: usize,
        rows: Vec<(DocumentId, Vec<u8>)>,
    ) -> Result<(Self, ReloadReport), VectorError> {
        let mut vectors = Vec::with_capacity(rows.len());
        let mut ids = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for (id, blob) in rows {
            match codec::decode(&blob, dim) {
                Ok(vector) => {
                    vectors.push(vector);
                    ids.push(id);
                }
                Err(err) => {
                    tracing::warn!(id, error = %err, "skipping unreadable stored embedding");
                    skipped += 1;
                }
            }
        }

        let mut corpus = Self::empty(dim, parallel_search_min)?;
        corpus.index.reload(&vectors)?;
        corpus.ids.rebuild(ids);
        let report = ReloadReport {
            loaded: corpus.len(),
            skipped,
        };
        Ok((corpus, report))
    }

    pub fn append(&mut self, id: DocumentId, vector: Vec<f32>) -> Result<usize, VectorError> {
        let position = self.index.append(vector)?;
        self.ids.append(id);
        Ok(position)
    }

    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<Neighbor>, VectorError> {
        self.index.search_within(query, k, threshold)
    }

    pub fn resolve(&self, position: usize) -> Result<DocumentId, VectorError> {
        self.ids.resolve(position)
    }

    pub fn last_id(&self) -> Option<DocumentId> {
        self.ids.ids().last().copied()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn identities(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
impl IndexedCorpus {
    /// Push a row into the index without a matching identity entry.
    pub(super) fn push_unmapped_row(&mut self, vector: Vec<f32>) -> Result<usize, VectorError> {
        self.index.append(vector)
    }
}
