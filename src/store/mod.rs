//! Persistent document records. The store is the source of truth for text,
//! embeddings and identifier assignment; the vector index is rebuilt from it.

mod memory;
mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

use serde::Serialize;

pub type DocumentId = i64;

/// A record as persisted: the embedding is kept in its encoded form.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub text: String,
    #[serde(skip)]
    pub embedding: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

pub trait DocumentStore: Send + Sync {
    /// Persist a new record and return the identifier assigned to it.
    /// Identifiers grow strictly with insertion order.
    fn insert(&self, text: &str, embedding: &[u8]) -> Result<DocumentId, StoreError>;

    /// Records for the given ids in ascending id order. Unknown ids are
    /// silently omitted.
    fn fetch_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<StoredDocument>, StoreError>;

    /// The subset of `ids` that exist, ascending.
    fn existing_ids(&self, ids: &[DocumentId]) -> Result<Vec<DocumentId>, StoreError>;

    /// Every `(id, encoded embedding)` pair in ascending id order.
    fn scan_embeddings(&self) -> Result<Vec<(DocumentId, Vec<u8>)>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}
