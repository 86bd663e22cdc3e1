use super::simd;
use super::{Neighbor, VectorError};
use rayon::prelude::*;
use std::cmp::Ordering;

const DEFAULT_PARALLEL_SEARCH_MIN: usize = 4096;

/// `VectorIndex` describes what the retrieval path needs from an in-memory
/// nearest-neighbour structure. Positions are dense, assigned in insertion
/// order, and carry no knowledge of document identifiers.
pub trait VectorIndex: Send + Sync {
    fn dimension(&self) -> usize;
    fn len(&self) -> usize;
    fn append(&mut self, vector: Vec<f32>) -> Result<usize, VectorError>;
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, VectorError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `search` followed by dropping every hit whose similarity falls below
    /// `threshold`. A threshold of 0 keeps everything.
    fn search_within(
        &self,
        query: &[f32],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<Neighbor>, VectorError> {
        let mut hits = self.search(query, k)?;
        if threshold > 0.0 {
            hits.retain(|hit| hit.similarity() >= threshold);
        }
        Ok(hits)
    }
}

/// Exact (brute force) squared-L2 index over a contiguous row-major buffer.
#[derive(Clone, Debug)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
    simd_enabled: bool,
    parallel_search_min: usize,
}

impl FlatIndex {
    /// An empty index for `dim`-dimensional vectors. `dim` must be non-zero.
    pub fn new(dim: usize) -> Result<Self, VectorError> {
        if dim == 0 {
            return Err(VectorError::ZeroDimension);
        }
        Ok(Self {
            dim,
            data: Vec::new(),
            simd_enabled: true,
            parallel_search_min: DEFAULT_PARALLEL_SEARCH_MIN,
        })
    }

    pub fn with_parallel_search_min(mut self, min: usize) -> Self {
        self.parallel_search_min = min.max(1);
        self
    }

    pub fn with_simd(mut self, enabled: bool) -> Self {
        self.simd_enabled = enabled;
        self
    }

    /// Replace the whole collection. Every vector is checked before anything
    /// is touched, so a bad input leaves the previous contents in place.
    pub fn reload(&mut self, vectors: &[Vec<f32>]) -> Result<(), VectorError> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                actual: bad.len(),
            });
        }
        let mut data = Vec::with_capacity(vectors.len() * self.dim);
        for v in vectors {
            data.extend_from_slice(v);
        }
        self.data = data;
        Ok(())
    }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    fn distances(&self, query: &[f32]) -> Vec<(f32, usize)> {
        let simd_enabled = self.simd_enabled;
        if self.len() >= self.parallel_search_min {
            self.data
                .par_chunks_exact(self.dim)
                .enumerate()
                .map(|(pos, row)| (simd::l2_squared(query, row, simd_enabled), pos))
                .collect()
        } else {
            self.data
                .chunks_exact(self.dim)
                .enumerate()
                .map(|(pos, row)| (simd::l2_squared(query, row, simd_enabled), pos))
                .collect()
        }
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    fn append(&mut self, vector: Vec<f32>) -> Result<usize, VectorError> {
        if vector.len() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                actual: vector.len(),
            });
        }
        let position = self.len();
        self.data.extend_from_slice(&vector);
        Ok(position)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, VectorError> {
        if query.len() != self.dim {
            return Err(VectorError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut scored = self.distances(query);
        let k = k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank);

        Ok(scored
            .into_iter()
            .map(|(distance, position)| Neighbor { position, distance })
            .collect())
    }
}

/// Ascending distance, ties broken by insertion position.
fn rank(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}
