//! Persisted memory record types

use crate::{
    compute_content_hash, content_hash_hex, EmbeddingVector, Evaluation, ReasoningTrace,
    Timestamp, TraceId, VectorId,
};
use serde::{Deserialize, Serialize};

/// Serialized trace + evaluation stored alongside the vector.
///
/// This is what a vector store persists as the record body; the embedding
/// itself is carried separately so backends can index it natively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPayload {
    /// Trace this record was derived from.
    pub trace_id: TraceId,
    /// The serialized reasoning content that was embedded.
    pub content: String,
    /// Number of steps in the source trace.
    pub step_count: u32,
    /// Quality score reported by the evaluator.
    pub quality_score: f32,
    /// Efficiency score reported by the evaluator.
    pub efficiency_score: f32,
    /// Session the trace was captured in.
    pub session_id: String,
    /// When the trace was extracted upstream.
    pub extracted_at: Timestamp,
    /// SHA-256 of `content`, hex-encoded. Dedup key.
    pub content_hash: String,
    /// Free-form tags (task type, domain) for backend-side filtering.
    pub tags: Vec<String>,
}

impl MemoryPayload {
    /// Build a payload from a trace, its evaluation, and the serialized
    /// content that was (or will be) embedded.
    pub fn from_parts(trace: &ReasoningTrace, evaluation: &Evaluation, content: String) -> Self {
        let hash = compute_content_hash(content.as_bytes());
        Self {
            trace_id: trace.trace_id,
            content,
            step_count: trace.steps.len() as u32,
            quality_score: evaluation.quality_score,
            efficiency_score: evaluation.efficiency_score,
            session_id: trace.metadata.session_id.clone(),
            extracted_at: trace.metadata.extracted_at,
            content_hash: content_hash_hex(&hash),
            tags: vec![
                trace.metadata.task_context.task_type.clone(),
                trace.metadata.task_context.domain.clone(),
            ],
        }
    }
}

/// The persisted artifact, owned by the chosen vector store once inserted.
///
/// Created at insert time and never mutated by this subsystem afterward.
/// Exists iff the policy decision was "store" and the insert succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMemoryRecord {
    /// Identifier assigned by the store.
    pub vector_id: VectorId,
    /// Fixed-length embedding of the payload content.
    pub embedding: EmbeddingVector,
    /// Serialized trace + evaluation.
    pub payload: MemoryPayload,
    /// Logical collection the record lives in.
    pub collection: String,
}

// =============================================================================
// TESTS
// =============================================================================
