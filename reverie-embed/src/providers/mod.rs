//! Embedding provider implementations
//!
//! Concrete implementations of the EmbeddingProvider trait for hosted
//! embedding services.

pub mod openai;

pub use openai::{OpenAiClient, OpenAiEmbeddingProvider};

use reverie_core::{EmbeddingError, ReverieError};

/// Build a RequestFailed error for a provider.
pub(crate) fn request_failed(
    provider: &str,
    status: i32,
    message: impl Into<String>,
) -> ReverieError {
    ReverieError::Embedding(EmbeddingError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    })
}

/// Build a RateLimited error for a provider.
pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> ReverieError {
    ReverieError::Embedding(EmbeddingError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    })
}

/// Build an InvalidResponse error for a provider.
pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> ReverieError {
    ReverieError::Embedding(EmbeddingError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    })
}
