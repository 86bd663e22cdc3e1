//! Text to vector conversion. The engine only depends on the `Embedder`
//! trait; `HashEmbedder` is a deterministic stand-in for a sentence model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Prefix that makes `HashEmbedder` parse the rest of the text as a literal
/// comma-separated vector.
pub const LITERAL_VECTOR_PREFIX: &str = "TEST_VEC:";

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,
    #[error("embedding backend failed: {0}")]
    Backend(String),
}

pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Clone, Debug)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        if let Some(stripped) = text.trim().strip_prefix(LITERAL_VECTOR_PREFIX) {
            if let Ok(vec) = stripped
                .split(',')
                .map(|s| s.trim().parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
            {
                if !vec.is_empty() {
                    return Ok(vec);
                }
            }
        }

        let hash = crc32fast::hash(text.as_bytes());
        let mut rng = StdRng::seed_from_u64(hash as u64);
        Ok((0..self.dim).map(|_| rng.gen::<f32>()).collect())
    }
}
