//! Reverie Store - Vector Store Abstraction
//!
//! Defines the vector store capability the write path depends on, plus the
//! backends that implement it: an in-memory store and an HTTP-backed remote
//! store. Backends are interchangeable behind the trait.

pub mod manager;
pub mod memory;
pub mod remote;
pub mod selector;

pub use manager::{StoreRegistry, VectorStoreManager};
pub use memory::InMemoryVectorStore;
pub use remote::{RemoteStoreConfig, RemoteVectorStore};
pub use selector::resolve_store;

use async_trait::async_trait;
use reverie_core::{EmbeddingVector, MemoryPayload, ReverieResult, VectorId};
use serde::{Deserialize, Serialize};

// ============================================================================
// VECTOR STORE TRAIT
// ============================================================================

/// Health status of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Ok,
    Degraded,
    Offline,
}

/// Introspection data for a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Number of records in the collection.
    pub count: usize,
    /// Health status reported by the backend.
    pub status: CollectionStatus,
}

/// One ranked result from a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub vector_id: VectorId,
    pub score: f32,
    pub payload: MemoryPayload,
}

/// Vector store capability.
///
/// Implementations must be thread-safe and safe for concurrent use; each
/// insert is independent and the backend owns any consistency guarantees
/// across concurrent inserts into one collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert an embedding with its payload. Returns the assigned vector ID.
    ///
    /// The embedding's dimension must match `dimensions()`; a mismatch fails
    /// with `StorageError::DimensionMismatch` and nothing is persisted.
    async fn insert(
        &self,
        embedding: EmbeddingVector,
        payload: MemoryPayload,
    ) -> ReverieResult<VectorId>;

    /// Search for the `limit` most similar records.
    async fn search(
        &self,
        query: &EmbeddingVector,
        limit: usize,
    ) -> ReverieResult<Vec<SearchMatch>>;

    /// Whether the backend is currently reachable.
    fn is_connected(&self) -> bool;

    /// Dimension of vectors this store accepts.
    fn dimensions(&self) -> i32;

    /// Name of the logical collection this store writes to.
    fn collection_name(&self) -> &str;

    /// Introspect the collection.
    async fn collection_info(&self) -> ReverieResult<CollectionInfo>;
}

impl std::fmt::Debug for dyn VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("collection_name", &self.collection_name())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
