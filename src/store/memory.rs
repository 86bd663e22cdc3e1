use super::{DocumentId, DocumentStore, StoreError, StoredDocument};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Process-local store used when no data directory is configured.
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    last_id: DocumentId,
    docs: BTreeMap<DocumentId, StoredDocument>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn insert(&self, text: &str, embedding: &[u8]) -> Result<DocumentId, StoreError> {
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let id = inner.last_id;
        inner.docs.insert(
            id,
            StoredDocument {
                id,
                text: text.to_string(),
                embedding: embedding.to_vec(),
            },
        );
        Ok(id)
    }

    fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<StoredDocument>, StoreError> {
        let inner = self.inner.read();
        let mut wanted: Vec<DocumentId> = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();
        Ok(wanted
            .into_iter()
            .filter_map(|id| inner.docs.get(&id).cloned())
            .collect())
    }

    fn existing_ids(&self, ids: &[DocumentId]) -> Result<Vec<DocumentId>, StoreError> {
        let inner = self.inner.read();
        let mut found: Vec<DocumentId> = ids
            .iter()
            .copied()
            .filter(|id| inner.docs.contains_key(id))
            .collect();
        found.sort_unstable();
        found.dedup();
        Ok(found)
    }

    fn scan_embeddings(&self) -> Result<Vec<(DocumentId, Vec<u8>)>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .docs
            .values()
            .map(|doc| (doc.id, doc.embedding.clone()))
            .collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().docs.len())
    }
}
