//! Embedding vector operations

use crate::{ReverieError, ReverieResult, StorageError};
use serde::{Deserialize, Serialize};

/// A fixed-length embedding produced by some model, tagged with the model
/// that produced it. `dimensions` is carried explicitly so stores can check
/// compatibility without touching the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub data: Vec<f32>,
    pub model_id: String,
    /// Must equal `data.len()`; see [`EmbeddingVector::is_valid`].
    pub dimensions: i32,
}

impl EmbeddingVector {
    pub fn new(data: Vec<f32>, model_id: impl Into<String>) -> Self {
        let dimensions = data.len() as i32;
        Self {
            data,
            model_id: model_id.into(),
            dimensions,
        }
    }

    /// Cosine of the angle between two vectors, in [-1, 1].
    ///
    /// A zero vector on either side compares as 0.0 rather than NaN.
    /// Vectors of different dimension do not compare at all.
    pub fn cosine_similarity(&self, other: &EmbeddingVector) -> ReverieResult<f32> {
        if self.dimensions != other.dimensions {
            return Err(ReverieError::Storage(StorageError::DimensionMismatch {
                expected: self.dimensions,
                got: other.dimensions,
            }));
        }

        let mut dot = 0.0f32;
        let mut self_sq = 0.0f32;
        let mut other_sq = 0.0f32;
        for (x, y) in self.data.iter().zip(&other.data) {
            dot += x * y;
            self_sq += x * x;
            other_sq += y * y;
        }

        let denom = self_sq.sqrt() * other_sq.sqrt();
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok(dot / denom)
    }

    /// True when `dimensions` is positive and agrees with the data length.
    pub fn is_valid(&self) -> bool {
        self.dimensions > 0 && self.data.len() == self.dimensions as usize
    }
}

// =============================================================================
// TESTS
// =============================================================================
