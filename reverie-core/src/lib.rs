//! Reverie Core - Entity Types
//!
//! Pure data structures with no behavior beyond construction and structural
//! validity checks. All other crates depend on this. This crate contains
//! ONLY data types - no business logic.

pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod identity;
pub mod record;
pub mod trace;

pub use embedding::EmbeddingVector;
pub use error::{
    EmbeddingError, ReverieError, ReverieResult, ServiceError, StorageError, ValidationError,
};
pub use evaluation::Evaluation;
pub use identity::{
    compute_content_hash, content_hash_hex, new_entity_id, ContentHash, Timestamp, TraceId,
    VectorId,
};
pub use record::{MemoryPayload, StoredMemoryRecord};
pub use trace::{
    Complexity, ComplexityParseError, ReasoningStep, ReasoningTrace, StepKind, StepKindParseError,
    TaskContext, TraceMetadata,
};
