use super::{Engine, EngineError, Retrieval};
use crate::store::DocumentId;
use serde::Serialize;
use std::collections::HashSet;

pub const NO_CONTENT: &str = "No relevant content found.";
pub const EMBEDDING_FAILED: &str = "Embedding generation failed.";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Answer {
    pub answer: String,
    pub message: &'static str,
    pub document_ids: Vec<DocumentId>,
}

/// Join the distinct, non-blank texts of the retrieved records in rank order.
pub fn compose_answer(retrieval: &Retrieval) -> String {
    let mut seen = HashSet::new();
    let parts: Vec<&str> = retrieval
        .documents
        .iter()
        .map(|doc| doc.text.trim())
        .filter(|text| !text.is_empty())
        .filter(|text| seen.insert(*text))
        .collect();
    if parts.is_empty() {
        return NO_CONTENT.to_string();
    }
    parts.join(" ")
}

impl Engine {
    /// Answer a natural-language question with the configured `k` and
    /// similarity threshold.
    pub fn ask(&self, question: &str) -> Result<Answer, EngineError> {
        self.ask_with_k(question, self.0.config.default_k)
    }

    pub fn ask_with_k(&self, question: &str, k: usize) -> Result<Answer, EngineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(EngineError::EmptyQuestion);
        }
        let query = match self.0.embedder.embed(question) {
            Ok(query) => query,
            Err(err) => {
                self.0.metrics.inc_degraded();
                tracing::warn!(error = %err, "failed to embed question");
                return Ok(Answer {
                    answer: NO_CONTENT.to_string(),
                    message: EMBEDDING_FAILED,
                    document_ids: Vec::new(),
                });
            }
        };

        let retrieval = self.answer_query(&query, k, self.0.config.similarity_threshold);
        tracing::info!(
            documents = retrieval.documents.len(),
            scope = retrieval.message,
            "question answered"
        );
        Ok(Answer {
            answer: compose_answer(&retrieval),
            message: retrieval.message,
            document_ids: retrieval.ids(),
        })
    }
}
