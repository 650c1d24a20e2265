//! Flat inner-product vector index
//!
//! Exhaustive scan over a row-major `f32` matrix. Vectors are indexed as
//! given; callers unit-normalize them when inner product should mean cosine.

use crate::error::{RetrievalError, Result};

/// Numeric floor for L2 normalization
pub const NORM_EPSILON: f32 = 1e-12;

/// Scale `vector` to unit length, dividing by `max(norm, NORM_EPSILON)`
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm.max(NORM_EPSILON);
    for x in vector.iter_mut() {
        *x /= denom;
    }
}

/// Inner product of two equal-length vectors
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Reject vectors carrying NaN or infinite components
pub fn ensure_finite(vector: &[f32], label: &str) -> Result<()> {
    match vector.iter().position(|x| !x.is_finite()) {
        Some(at) => Err(RetrievalError::shape(format!(
            "{} has a non-finite component at {}",
            label, at
        ))),
        None => Ok(()),
    }
}

/// Dense 2-D embedding matrix with a fixed row width
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dimension: usize,
}

impl EmbeddingMatrix {
    /// Empty matrix of the given width
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            dimension,
        }
    }

    /// Validate provider output as a matrix with at least one row, a
    /// single non-zero width and finite components
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let first = rows
            .first()
            .ok_or_else(|| RetrievalError::shape("provider returned no vectors"))?;
        let dimension = first.len();
        if dimension == 0 {
            return Err(RetrievalError::shape("provider returned zero-width vectors"));
        }

        let mut data = Vec::with_capacity(rows.len() * dimension);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(RetrievalError::shape(format!(
                    "row {} has width {}, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            ensure_finite(row, &format!("row {}", i))?;
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            rows: rows.len(),
            dimension,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        if position >= self.rows {
            return None;
        }
        let start = position * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension.max(1))
    }

    /// L2-normalize every row in place
    pub fn normalize_rows(&mut self) {
        if self.dimension == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.dimension) {
            l2_normalize(row);
        }
    }
}

/// One search hit: row position and inner-product score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub score: f32,
}

/// Flat inner-product index over vectors of one fixed dimension
#[derive(Debug, Clone)]
pub struct VectorIndex {
    vectors: EmbeddingMatrix,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: EmbeddingMatrix::with_dimension(dimension),
        }
    }

    /// Append rows; positions continue from the current length
    pub fn add(&mut self, matrix: &EmbeddingMatrix) -> Result<()> {
        if matrix.dimension() != self.dimension() {
            return Err(RetrievalError::shape(format!(
                "cannot add {}-d vectors to a {}-d index",
                matrix.dimension(),
                self.dimension()
            )));
        }
        self.vectors.data.extend_from_slice(&matrix.data);
        self.vectors.rows += matrix.rows();
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn len(&self) -> usize {
        self.vectors.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The indexed vectors, in position order
    pub fn vectors(&self) -> &EmbeddingMatrix {
        &self.vectors
    }

    /// Up to `k` nearest rows by descending inner product
    ///
    /// Equal scores are ordered by ascending position. Asking for more
    /// rows than are indexed returns all of them.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension() {
            return Err(RetrievalError::shape(format!(
                "query has width {}, index expects {}",
                query.len(),
                self.dimension()
            )));
        }

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter_rows()
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                score: inner_product(query, row),
            })
            .collect();

        let k = k.min(hits.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let order = |a: &Neighbor, b: &Neighbor| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        };
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, order);
            hits.truncate(k);
        }
        hits.sort_unstable_by(order);

        Ok(hits)
    }
}
