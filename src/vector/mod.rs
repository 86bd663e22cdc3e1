pub mod codec;
mod identity;
pub mod index;
mod simd;

pub use identity::IdentityMap;
pub use index::{FlatIndex, VectorIndex};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VectorError {
    #[error("vector dimension must be greater than zero")]
    ZeroDimension,
    #[error("vector dim mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("index position {position} out of range (len {len})")]
    OutOfRange { position: usize, len: usize },
}

/// One search hit: a dense index position and its squared L2 distance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

impl Neighbor {
    pub fn similarity(&self) -> f32 {
        1.0 / (1.0 + self.distance)
    }
}
