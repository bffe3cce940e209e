//! Exact inner-product index over a contiguous vector matrix.
//!
//! Vectors are stored row-major in one `n x D` array. Search is a linear scan
//! that keeps the best `k` candidates in a bounded heap, so a query costs
//! O(n·D) time and O(k) extra space.

use ndarray::{Array2, ArrayView1};
use semsearch_common::{DimensionSite, IndexError};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::debug;

use crate::types::{Neighbor, VectorId};

/// Heap entry ordered so the *worst* candidate sits on top.
///
/// Lower score is worse; on equal scores the higher id is worse, which keeps
/// the lowest insertion order when ties straddle the cut-off.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f32,
    id: VectorId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Flat (brute-force) inner-product index
///
/// Immutable once built. Identifier `i` always refers to the i-th vector
/// passed to [`FlatIndex::build`].
#[derive(Debug, Clone)]
pub struct FlatIndex {
    vectors: Array2<f32>,
}

impl FlatIndex {
    /// Build an index from a batch of equal-length vectors
    ///
    /// The first vector fixes the dimension. Vectors are expected to be
    /// L2-normalized so scores are cosine similarities; this is not checked.
    pub fn build<V: AsRef<[f32]>>(vectors: &[V]) -> Result<Self, IndexError> {
        let rows: Vec<&[f32]> = vectors.iter().map(|v| v.as_ref()).collect();

        let dimension = rows.first().ok_or(IndexError::EmptyInput)?.len();
        if dimension == 0 {
            return Err(IndexError::ZeroDimension);
        }

        if let Some((i, v)) = rows.iter().enumerate().find(|(_, v)| v.len() != dimension) {
            return Err(IndexError::DimensionMismatch {
                expected: dimension,
                actual: v.len(),
                position: DimensionSite::Vector(i),
            });
        }

        let mut matrix = Array2::<f32>::zeros((rows.len(), dimension));
        for (mut row, v) in matrix.rows_mut().into_iter().zip(&rows) {
            row.assign(&ArrayView1::from(*v));
        }

        debug!("Built flat index: {} vectors, dimension {}", rows.len(), dimension);
        Ok(Self { vectors: matrix })
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    /// Always false for a built index
    pub fn is_empty(&self) -> bool {
        self.vectors.nrows() == 0
    }

    /// Vector dimension fixed at build time
    pub fn dimension(&self) -> usize {
        self.vectors.ncols()
    }

    /// Stored vector for an identifier
    pub fn vector(&self, id: VectorId) -> Option<&[f32]> {
        if id >= self.len() {
            return None;
        }
        self.vectors.row(id).to_slice()
    }

    /// Exact top-k search by inner product
    ///
    /// Results are sorted by descending score, ties by ascending id.
    /// A `k` larger than the index is clamped to the index size.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dimension() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
                position: DimensionSite::Query,
            });
        }
        if k == 0 {
            return Err(IndexError::InvalidK { k });
        }

        let k = k.min(self.len());
        let query = ArrayView1::from(query);
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);

        for (id, row) in self.vectors.rows().into_iter().enumerate() {
            let candidate = Candidate {
                score: row.dot(&query),
                id,
            };

            if heap.len() < k {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        // Ascending in heap order is best-first
        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .enumerate()
            .map(|(i, c)| Neighbor {
                rank: i + 1,
                score: c.score,
                id: c.id,
            })
            .collect())
    }
}
