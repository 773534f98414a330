//! Error types for Reverie operations

use thiserror::Error;

/// Validation errors for caller-supplied input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid trace: steps array is empty")]
    EmptySteps,

    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Service availability errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Services context is required")]
    ContextMissing,

    #[error("No vector store available for collection {collection:?}")]
    NoStoreAvailable { collection: String },
}

/// Embedding capability errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmbeddingError {
    #[error("No embedding provider configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Embedding failed: {reason}")]
    EmbeddingFailed { reason: String },
}

/// Vector store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Insert failed in collection {collection}: {reason}")]
    InsertFailed { collection: String, reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: i32, got: i32 },

    #[error("Vector store {collection} is not connected")]
    NotConnected { collection: String },

    #[error("Search failed in collection {collection}: {reason}")]
    SearchFailed { collection: String, reason: String },

    #[error("Collection info unavailable for {collection}: {reason}")]
    InfoUnavailable { collection: String, reason: String },
}

/// Master error type for all Reverie errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReverieError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for Reverie operations.
pub type ReverieResult<T> = Result<T, ReverieError>;

// =============================================================================
// TESTS
// =============================================================================
