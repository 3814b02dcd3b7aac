//! Exact nearest-neighbor search over fixed-dimension vectors.
//!
//! Rows are stored contiguously in insertion order; row `i` belongs to
//! document `i` of the [`DocumentStore`](crate::DocumentStore) the index was
//! built from. Distances are squared Euclidean.

use crate::error::{Result, StoreError};

/// Map a squared-L2 distance to a relevance score in `(0, 1]`.
///
/// Distance `0` maps to `1.0`; the score falls towards `0` as distance grows.
/// Thresholds are compared against this value, so its form is fixed.
#[must_use]
pub fn relevance(distance: f32) -> f32 {
    1.0 / (1.0 + distance)
}

/// A search hit: index row and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

impl Neighbor {
    #[must_use]
    pub fn relevance(&self) -> f32 {
        relevance(self.distance)
    }
}

/// Brute-force L2 index. Append-only; the dimension is fixed by the first vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    dimension: Option<usize>,
    data: Vec<f32>,
}

impl VectorIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from vectors in row order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DimensionMismatch`] if the vectors do not all share
    /// the dimension of the first one.
    pub fn build<I, V>(vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[f32]>,
    {
        let mut index = Self::new();
        for v in vectors {
            index.add(v.as_ref())?;
        }
        tracing::info!(
            vectors = index.len(),
            dimension = index.dimension.unwrap_or(0),
            "vector index built"
        );
        Ok(index)
    }

    /// Append one vector and return its row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DimensionMismatch`] if `vector` does not match the
    /// index dimension, or [`StoreError::Configuration`] for an empty first vector.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            Some(_) => {}
            None if vector.is_empty() => {
                return Err(StoreError::Configuration(
                    "vector dimension must be greater than zero".into(),
                ));
            }
            None => self.dimension = Some(vector.len()),
        }
        let row = self.len();
        self.data.extend_from_slice(vector);
        Ok(row)
    }

    /// The `k` rows closest to `query`, nearest first.
    ///
    /// Equal distances are ordered by ascending row. Returns every row when the
    /// index holds fewer than `k`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexNotReady`] if the index is empty, or
    /// [`StoreError::DimensionMismatch`] if `query` has the wrong length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let Some(dimension) = self.dimension.filter(|_| !self.data.is_empty()) else {
            return Err(StoreError::IndexNotReady);
        };
        if query.len() != dimension {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(dimension)
            .enumerate()
            .map(|(row, v)| Neighbor {
                row,
                distance: squared_l2(query, v),
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.row.cmp(&b.row)));
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of stored vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimension.map_or(0, |d| self.data.len() / d)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// The stored vector at `row`.
    #[must_use]
    pub fn reconstruct(&self, row: usize) -> Option<&[f32]> {
        let d = self.dimension?;
        self.data.get(row * d..(row + 1) * d)
    }

    /// Up to `n` stored vectors starting at `start`.
    #[must_use]
    pub fn reconstruct_n(&self, start: usize, n: usize) -> Vec<&[f32]> {
        (start..start.saturating_add(n).min(self.len()))
            .filter_map(|row| self.reconstruct(row))
            .collect()
    }

    pub(crate) fn raw(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn from_raw(dimension: Option<usize>, data: Vec<f32>) -> Self {
        Self { dimension, data }
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
