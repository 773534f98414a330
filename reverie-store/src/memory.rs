//! In-memory vector store backend

use crate::{CollectionInfo, CollectionStatus, SearchMatch, VectorStore};
use async_trait::async_trait;
use reverie_core::{
    new_entity_id, EmbeddingVector, MemoryPayload, ReverieError, ReverieResult, StorageError,
    StoredMemoryRecord, VectorId,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory vector store.
///
/// Records live in a process-local map; search is a linear cosine scan.
/// Suitable for tests, single-process deployments, and as the default
/// fallback when no remote backend is configured.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    records: Arc<RwLock<HashMap<VectorId, StoredMemoryRecord>>>,
    collection: String,
    dimensions: i32,
}

impl InMemoryVectorStore {
    /// Create a new empty store for a collection.
    pub fn new(collection: impl Into<String>, dimensions: i32) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            collection: collection.into(),
            dimensions,
        }
    }

    /// Get a stored record by ID.
    pub fn get(&self, id: VectorId) -> Option<StoredMemoryRecord> {
        self.records.read().ok()?.get(&id).cloned()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all stored records.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(
        &self,
        embedding: EmbeddingVector,
        payload: MemoryPayload,
    ) -> ReverieResult<VectorId> {
        if embedding.dimensions != self.dimensions {
            return Err(ReverieError::Storage(StorageError::DimensionMismatch {
                expected: self.dimensions,
                got: embedding.dimensions,
            }));
        }
        if !embedding.is_valid() {
            return Err(ReverieError::Storage(StorageError::InsertFailed {
                collection: self.collection.clone(),
                reason: "embedding data length does not match dimensions".to_string(),
            }));
        }

        let vector_id = new_entity_id();
        let record = StoredMemoryRecord {
            vector_id,
            embedding,
            payload,
            collection: self.collection.clone(),
        };

        let mut records =
            self.records
                .write()
                .map_err(|_| ReverieError::Storage(StorageError::InsertFailed {
                    collection: self.collection.clone(),
                    reason: "store lock poisoned".to_string(),
                }))?;
        records.insert(vector_id, record);

        Ok(vector_id)
    }

    async fn search(
        &self,
        query: &EmbeddingVector,
        limit: usize,
    ) -> ReverieResult<Vec<SearchMatch>> {
        let records =
            self.records
                .read()
                .map_err(|_| ReverieError::Storage(StorageError::SearchFailed {
                    collection: self.collection.clone(),
                    reason: "store lock poisoned".to_string(),
                }))?;

        let mut matches = Vec::with_capacity(records.len());
        for record in records.values() {
            let score = query.cosine_similarity(&record.embedding)?;
            matches.push(SearchMatch {
                vector_id: record.vector_id,
                score,
                payload: record.payload.clone(),
            });
        }

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);

        Ok(matches)
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn dimensions(&self) -> i32 {
        self.dimensions
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }

    async fn collection_info(&self) -> ReverieResult<CollectionInfo> {
        Ok(CollectionInfo {
            count: self.len(),
            status: CollectionStatus::Ok,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
