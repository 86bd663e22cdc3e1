//! Query-time path: index search, identity resolution, selection filtering,
//! record fetch and de-duplication.
//!
//! The index itself never sees the selection. Filtering happens after the
//! top-k search, so an active selection can yield fewer than `k` records
//! when few selected documents rank that high.

use super::{Engine, EngineError};
use crate::store::{DocumentId, StoredDocument};
use crate::vector::codec;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const NO_RELEVANT_DOCUMENTS: &str = "No relevant documents found.";
pub const SELECTED_DOCUMENTS: &str = "Answer is based on selected documents.";
pub const ALL_DOCUMENTS: &str =
    "No documents selected. Answer is based on all available documents.";
pub const RETRIEVAL_FAILED: &str = "Document retrieval failed; no documents were consulted.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub text: String,
    #[serde(skip)]
    pub vector: Vec<f32>,
}

/// Retrieved records, best match first, plus a provenance message saying
/// which documents the answer may draw on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Retrieval {
    pub documents: Vec<DocumentRecord>,
    pub message: &'static str,
}

impl Retrieval {
    pub fn empty(message: &'static str) -> Self {
        Self {
            documents: Vec::new(),
            message,
        }
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.documents.iter().map(|doc| doc.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Engine {
    /// Retrieve the documents nearest to `query`. Never fails: any error
    /// local to this query is logged and reported as an empty result.
    pub fn answer_query(&self, query: &[f32], k: usize, threshold: f32) -> Retrieval {
        self.0.metrics.inc_queries();
        match self.retrieve(query, k, threshold) {
            Ok(retrieval) => retrieval,
            Err(err) => {
                self.0.metrics.inc_degraded();
                tracing::warn!(error = %err, "retrieval degraded to empty result");
                Retrieval::empty(RETRIEVAL_FAILED)
            }
        }
    }

    /// Like `answer_query` but surfaces errors to the caller.
    pub fn retrieve(
        &self,
        query: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<Retrieval, EngineError> {
        let (candidates, dropped) = {
            let corpus = self.0.corpus.read();
            let hits = corpus.search(query, k, threshold)?;
            let mut candidates = Vec::with_capacity(hits.len());
            let mut dropped = 0usize;
            for hit in &hits {
                match corpus.resolve(hit.position) {
                    Ok(id) => candidates.push(id),
                    Err(err) => {
                        tracing::error!(error = %err, "index and identity map disagree");
                        dropped += 1;
                    }
                }
            }
            (candidates, dropped)
        };
        if dropped > 0 {
            if let Err(err) = self.reload() {
                tracing::error!(error = %err, "reload after identity map breach failed");
            }
        }
        if candidates.is_empty() {
            return Ok(Retrieval::empty(NO_RELEVANT_DOCUMENTS));
        }

        let selection = if self.0.selection.is_active() {
            Some(self.0.selection.snapshot())
        } else {
            None
        };
        let (candidates, message) = match selection {
            // A clear racing in after `is_active` leaves an empty snapshot.
            Some(selected) if !selected.is_empty() => {
                let narrowed = candidates
                    .into_iter()
                    .filter(|id| selected.contains(id))
                    .collect::<Vec<_>>();
                (narrowed, SELECTED_DOCUMENTS)
            }
            _ => (candidates, ALL_DOCUMENTS),
        };
        if candidates.is_empty() {
            return Ok(Retrieval::empty(NO_RELEVANT_DOCUMENTS));
        }

        let fetched = self.0.store.fetch_by_ids(&candidates)?;
        let documents = self.order_records(&candidates, fetched);
        if documents.is_empty() {
            return Ok(Retrieval::empty(NO_RELEVANT_DOCUMENTS));
        }
        tracing::debug!(count = documents.len(), "retrieved documents");
        Ok(Retrieval { documents, message })
    }

    /// Decode fetched rows, drop duplicates and put them back in rank order.
    fn order_records(
        &self,
        ranked: &[DocumentId],
        fetched: Vec<StoredDocument>,
    ) -> Vec<DocumentRecord> {
        let dim = self.0.config.dimension;
        let mut by_id: HashMap<DocumentId, DocumentRecord> = HashMap::with_capacity(fetched.len());
        for doc in fetched {
            if by_id.contains_key(&doc.id) {
                continue;
            }
            match codec::decode(&doc.embedding, dim) {
                Ok(vector) => {
                    by_id.insert(
                        doc.id,
                        DocumentRecord {
                            id: doc.id,
                            text: doc.text,
                            vector,
                        },
                    );
                }
                Err(err) => {
                    tracing::warn!(id = doc.id, error = %err, "dropping unreadable record");
                }
            }
        }

        let mut seen = HashSet::with_capacity(ranked.len());
        ranked
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| by_id.remove(id))
            .collect()
    }
}
