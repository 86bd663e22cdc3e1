mod answer;
mod corpus;
mod metrics;
mod retrieval;
mod selection;

pub use answer::{compose_answer, Answer, EMBEDDING_FAILED, NO_CONTENT};
pub use corpus::{IndexedCorpus, ReloadReport};
pub use metrics::Metrics;
pub use retrieval::{
    DocumentRecord, Retrieval, ALL_DOCUMENTS, NO_RELEVANT_DOCUMENTS, RETRIEVAL_FAILED,
    SELECTED_DOCUMENTS,
};
pub use selection::{SelectionError, SelectionFilter};

use crate::config::Config;
use crate::embedding::{Embedder, EmbeddingError, HashEmbedder};
use crate::store::{DocumentId, DocumentStore, MemoryDocumentStore, SqliteDocumentStore, StoreError};
use crate::vector::codec::{self, CodecError};
use crate::vector::VectorError;
use anyhow::Context;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct Engine(Arc<Inner>);

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Vector(#[from] VectorError),
    #[error("invalid embedding: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("question cannot be empty")]
    EmptyQuestion,
}

struct Inner {
    config: Config,
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn Embedder>,
    corpus: RwLock<IndexedCorpus>,
    selection: SelectionFilter,
    metrics: Arc<Metrics>,
    // Serialises ingestion and reloads so the published pair is only ever
    // replaced by one writer at a time.
    commit_lock: Mutex<()>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EngineStats {
    pub dimension: usize,
    pub indexed: usize,
    pub identities: usize,
    pub stored: usize,
    pub selected: usize,
}

impl Engine {
    /// Open the configured document store (SQLite when a data directory or
    /// database path is set, memory otherwise) and build the index from it.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.sqlite_file() {
            Some(path) => Arc::new(
                SqliteDocumentStore::open(&path)
                    .with_context(|| format!("open document store {}", path.display()))?,
            ),
            None => Arc::new(MemoryDocumentStore::new()),
        };
        let embedder = Arc::new(HashEmbedder::new(config.dimension));
        Self::with_parts(config, store, embedder)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn DocumentStore>,
        embedder: Arc<dyn Embedder>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        if embedder.dimension() != config.dimension {
            anyhow::bail!(
                "embedder produces {}-dimensional vectors but the index expects {}",
                embedder.dimension(),
                config.dimension
            );
        }
        let corpus = IndexedCorpus::empty(config.dimension, config.parallel_search_min)?;
        let engine = Self(Arc::new(Inner {
            config,
            store,
            embedder,
            corpus: RwLock::new(corpus),
            selection: SelectionFilter::new(),
            metrics: Arc::new(Metrics::default()),
            commit_lock: Mutex::new(()),
        }));
        let report = engine.reload().context("initial index load")?;
        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "index built from document store"
        );
        Ok(engine)
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.0.store
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.0.embedder
    }

    pub fn selection_filter(&self) -> &SelectionFilter {
        &self.0.selection
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.0.metrics.clone()
    }

    pub fn metrics_text(&self) -> String {
        self.0.metrics.render()
    }

    pub fn health(&self) -> &'static str {
        "ok"
    }

    /// Rebuild the index and identity map from a full ascending scan of the
    /// store, then publish the new pair in one swap.
    pub fn reload(&self) -> Result<ReloadReport, EngineError> {
        let _g = self.0.commit_lock.lock();
        self.reload_locked()
    }

    fn reload_locked(&self) -> Result<ReloadReport, EngineError> {
        let rows = self.0.store.scan_embeddings()?;
        let (corpus, report) = IndexedCorpus::build(
            self.0.config.dimension,
            self.0.config.parallel_search_min,
            rows,
        )?;
        *self.0.corpus.write() = corpus;
        self.0.metrics.record_reload(report.skipped);
        tracing::debug!(
            loaded = report.loaded,
            skipped = report.skipped,
            "index reloaded"
        );
        Ok(report)
    }

    /// Persist a document with a precomputed embedding and make it
    /// searchable. The vector is checked before anything is written.
    pub fn ingest(&self, text: &str, vector: Vec<f32>) -> Result<DocumentId, EngineError> {
        let dim = self.0.config.dimension;
        if vector.len() != dim {
            return Err(VectorError::DimensionMismatch {
                expected: dim,
                actual: vector.len(),
            }
            .into());
        }
        let blob = codec::encode(&vector);
        // Non-finite components would be skipped by the next reload.
        codec::decode(&blob, dim)?;

        let _g = self.0.commit_lock.lock();
        let id = self.0.store.insert(text, &blob)?;
        self.0.metrics.inc_ingested();

        if self.0.config.reindex_on_ingest {
            match self.reload_locked() {
                Ok(_) => {
                    tracing::info!(id, "document ingested");
                    return Ok(id);
                }
                Err(err) => {
                    tracing::warn!(id, error = %err, "reload after ingest failed; appending");
                }
            }
        }

        let mut corpus = self.0.corpus.write();
        let out_of_order = corpus.last_id().is_some_and(|last| id <= last);
        if out_of_order {
            drop(corpus);
            tracing::warn!(id, "store id not ascending past index; rebuilding");
            self.reload_locked()?;
        } else {
            corpus.append(id, vector)?;
        }
        tracing::info!(id, "document ingested");
        Ok(id)
    }

    /// Embed `text` with the configured embedder and ingest it.
    pub fn ingest_text(&self, text: &str) -> Result<DocumentId, EngineError> {
        let vector = self.0.embedder.embed(text)?;
        self.ingest(text, vector)
    }

    pub fn select(&self, ids: &[DocumentId]) -> Result<Vec<DocumentId>, SelectionError> {
        let selected = self.0.selection.select(ids, self.0.store.as_ref())?;
        self.0.metrics.inc_selection_changes();
        tracing::info!(count = selected.len(), "documents selected");
        Ok(selected)
    }

    pub fn clear_selection(&self) {
        self.0.selection.clear();
        self.0.metrics.inc_selection_changes();
        tracing::info!("selection cleared");
    }

    pub fn selection(&self) -> Vec<DocumentId> {
        self.0.selection.selected()
    }

    pub fn stats(&self) -> Result<EngineStats, EngineError> {
        let stored = self.0.store.count()?;
        let corpus = self.0.corpus.read();
        Ok(EngineStats {
            dimension: corpus.dimension(),
            indexed: corpus.len(),
            identities: corpus.identities(),
            stored,
            selected: self.0.selection.selected().len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let config = Config {
            dimension: 3,
            ..Config::default()
        };
        Engine::with_parts(
            config,
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(HashEmbedder::new(3)),
        )
        .unwrap()
    }

    #[test]
    fn unmapped_hit_is_dropped_and_triggers_reload() {
        let engine = engine();
        engine.ingest("x", vec![1.0, 0.0, 0.0]).unwrap();
        engine.ingest("y", vec![0.0, 1.0, 0.0]).unwrap();
        engine.ingest("z", vec![0.0, 0.0, 1.0]).unwrap();

        // One more index row than identities; the orphan is the best match.
        {
            let mut corpus = engine.0.corpus.read().clone();
            corpus.push_unmapped_row(vec![5.0, 5.0, 5.0]).unwrap();
            assert_eq!(corpus.len(), corpus.identities() + 1);
            *engine.0.corpus.write() = corpus;
        }
        let reloads = engine.metrics().index_reloads();

        let result = engine.answer_query(&[5.0, 5.0, 5.0], 4, 0.0);
        assert_eq!(result.ids().len(), 3);
        assert_eq!(result.message, ALL_DOCUMENTS);
        assert_eq!(engine.metrics().index_reloads(), reloads + 1);
        assert_eq!(engine.metrics().degraded_queries(), 0);

        let stats = engine.stats().unwrap();
        assert_eq!(stats.indexed, stats.identities);
        assert_eq!(stats.indexed, 3);
    }

    #[test]
    fn zero_dimension_config_is_refused() {
        let config = Config {
            dimension: 0,
            ..Config::default()
        };
        let built = Engine::with_parts(
            config,
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(HashEmbedder::new(0)),
        );
        assert!(built.is_err());
    }
}
