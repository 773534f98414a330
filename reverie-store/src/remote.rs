//! Remote vector store backend
//!
//! Talks to a qdrant-compatible REST API. Only the operations the shared
//! VectorStore capability needs are wired up: point upsert, similarity
//! search, and collection introspection.

use crate::{CollectionInfo, CollectionStatus, SearchMatch, VectorStore};
use async_trait::async_trait;
use reverie_core::{
    new_entity_id, EmbeddingVector, MemoryPayload, ReverieError, ReverieResult, StorageError,
    VectorId,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Configuration for a remote vector store.
#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    /// Base URL of the backend, e.g. "http://localhost:6333".
    pub base_url: String,
    /// Collection to write to.
    pub collection: String,
    /// Vector dimension the collection was created with.
    pub dimensions: i32,
    /// Optional API key sent as a header.
    pub api_key: Option<String>,
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct UpsertRequest {
    points: Vec<PointWrite>,
}

#[derive(Debug, Serialize)]
struct PointWrite {
    id: String,
    vector: Vec<f32>,
    payload: MemoryPayload,
}

#[derive(Debug, Serialize)]
struct SearchRequest {
    vector: Vec<f32>,
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: String,
    score: f32,
    payload: MemoryPayload,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    result: CollectionResult,
}

#[derive(Debug, Deserialize)]
struct CollectionResult {
    points_count: usize,
    status: String,
}

// ============================================================================
// STORE
// ============================================================================

/// Vector store backed by a qdrant-compatible HTTP service.
///
/// After a transport failure the store fails inserts and searches fast with
/// `StorageError::NotConnected` instead of retrying the backend. A later
/// successful `collection_info` health check clears the flag.
pub struct RemoteVectorStore {
    client: Client,
    config: RemoteStoreConfig,
    connected: AtomicBool,
}

impl RemoteVectorStore {
    /// Create a new remote store. No connection is attempted until the
    /// first operation.
    pub fn new(config: RemoteStoreConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            connected: AtomicBool::new(true),
        }
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/collections/{}{}",
            self.config.base_url, self.config.collection, suffix
        )
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("api-key", key.clone()),
            None => request,
        }
    }

    fn ensure_connected(&self) -> ReverieResult<()> {
        if self.connected.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(ReverieError::Storage(StorageError::NotConnected {
                collection: self.config.collection.clone(),
            }))
        }
    }

    fn insert_failed(&self, reason: impl Into<String>) -> ReverieError {
        self.connected.store(false, Ordering::Relaxed);
        ReverieError::Storage(StorageError::InsertFailed {
            collection: self.config.collection.clone(),
            reason: reason.into(),
        })
    }

    fn search_failed(&self, reason: impl Into<String>) -> ReverieError {
        self.connected.store(false, Ordering::Relaxed);
        ReverieError::Storage(StorageError::SearchFailed {
            collection: self.config.collection.clone(),
            reason: reason.into(),
        })
    }
}

#[async_trait]
impl VectorStore for RemoteVectorStore {
    async fn insert(
        &self,
        embedding: EmbeddingVector,
        payload: MemoryPayload,
    ) -> ReverieResult<VectorId> {
        self.ensure_connected()?;
        if embedding.dimensions != self.config.dimensions {
            return Err(ReverieError::Storage(StorageError::DimensionMismatch {
                expected: self.config.dimensions,
                got: embedding.dimensions,
            }));
        }

        let vector_id = new_entity_id();
        let request = UpsertRequest {
            points: vec![PointWrite {
                id: vector_id.to_string(),
                vector: embedding.data,
                payload,
            }],
        };

        let response = self
            .apply_auth(self.client.put(self.collection_url("/points")))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.insert_failed(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.insert_failed(format!("status {}: {}", status.as_u16(), body)));
        }

        self.connected.store(true, Ordering::Relaxed);
        Ok(vector_id)
    }

    async fn search(
        &self,
        query: &EmbeddingVector,
        limit: usize,
    ) -> ReverieResult<Vec<SearchMatch>> {
        self.ensure_connected()?;
        let request = SearchRequest {
            vector: query.data.clone(),
            limit,
            with_payload: true,
        };

        let response = self
            .apply_auth(self.client.post(self.collection_url("/points/search")))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.search_failed(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.search_failed(format!("status {}: {}", status.as_u16(), body)));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| self.search_failed(format!("Failed to parse response: {}", e)))?;

        self.connected.store(true, Ordering::Relaxed);

        let mut matches = Vec::with_capacity(parsed.result.len());
        for point in parsed.result {
            let vector_id = point
                .id
                .parse()
                .map_err(|_| self.search_failed(format!("non-UUID point id: {}", point.id)))?;
            matches.push(SearchMatch {
                vector_id,
                score: point.score,
                payload: point.payload,
            });
        }

        Ok(matches)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn dimensions(&self) -> i32 {
        self.config.dimensions
    }

    fn collection_name(&self) -> &str {
        &self.config.collection
    }

    async fn collection_info(&self) -> ReverieResult<CollectionInfo> {
        let response = self
            .apply_auth(self.client.get(self.collection_url("")))
            .send()
            .await
            .map_err(|e| {
                self.connected.store(false, Ordering::Relaxed);
                ReverieError::Storage(StorageError::InfoUnavailable {
                    collection: self.config.collection.clone(),
                    reason: format!("HTTP request failed: {}", e),
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReverieError::Storage(StorageError::InfoUnavailable {
                collection: self.config.collection.clone(),
                reason: format!("status {}", status.as_u16()),
            }));
        }

        let parsed: CollectionResponse = response.json().await.map_err(|e| {
            ReverieError::Storage(StorageError::InfoUnavailable {
                collection: self.config.collection.clone(),
                reason: format!("Failed to parse response: {}", e),
            })
        })?;

        self.connected.store(true, Ordering::Relaxed);

        let status = match parsed.result.status.as_str() {
            "green" | "ok" => CollectionStatus::Ok,
            "yellow" => CollectionStatus::Degraded,
            _ => CollectionStatus::Offline,
        };

        Ok(CollectionInfo {
            count: parsed.result.points_count,
            status,
        })
    }
}

impl std::fmt::Debug for RemoteVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteVectorStore")
            .field("base_url", &self.config.base_url)
            .field("collection", &self.config.collection)
            .field("dimensions", &self.config.dimensions)
            .field("api_key", &self.config.api_key.is_some())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RemoteStoreConfig {
        RemoteStoreConfig {
            base_url: "http://localhost:6333".to_string(),
            collection: "reflection".to_string(),
            dimensions: 128,
            api_key: None,
        }
    }

    #[test]
    fn test_collection_url() {
        let store = RemoteVectorStore::new(config());
        assert_eq!(
            store.collection_url("/points"),
            "http://localhost:6333/collections/reflection/points"
        );
        assert_eq!(
            store.collection_url(""),
            "http://localhost:6333/collections/reflection"
        );
    }

    #[test]
    fn test_accessors() {
        let store = RemoteVectorStore::new(config());
        assert_eq!(store.dimensions(), 128);
        assert_eq!(store.collection_name(), "reflection");
        assert!(store.is_connected());
    }

    #[tokio::test]
    async fn test_insert_rejects_dimension_mismatch_before_io() {
        let store = RemoteVectorStore::new(config());
        let payload_trace = {
            use chrono::Utc;
            use reverie_core::{
                Complexity, Evaluation, ReasoningStep, ReasoningTrace, StepKind, TaskContext,
                TraceMetadata,
            };
            let trace = ReasoningTrace::new(
                new_entity_id(),
                vec![ReasoningStep::new(StepKind::Thought, "t")],
                TraceMetadata {
                    extracted_at: Utc::now(),
                    conversation_length: 1,
                    step_count: 1,
                    has_explicit_markup: false,
                    session_id: "s".to_string(),
                    task_context: TaskContext {
                        goal: "g".to_string(),
                        input: "i".to_string(),
                        task_type: "t".to_string(),
                        domain: "d".to_string(),
                        complexity: Complexity::Low,
                    },
                },
            );
            MemoryPayload::from_parts(&trace, &Evaluation::new(0.5, 0.5, true), "c".to_string())
        };

        // Wrong dimension fails locally; no HTTP request is attempted, so
        // this works without a live backend.
        let err = store
            .insert(EmbeddingVector::new(vec![1.0, 0.0], "m"), payload_trace)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReverieError::Storage(StorageError::DimensionMismatch { expected: 128, got: 2 })
        ));
        // Local validation failures do not flip the connectivity flag.
        assert!(store.is_connected());
    }

    #[tokio::test]
    async fn test_disconnected_store_fails_fast_without_io() {
        let store = RemoteVectorStore::new(config());
        store.connected.store(false, Ordering::Relaxed);

        let payload = {
            use chrono::Utc;
            use reverie_core::{
                Complexity, Evaluation, ReasoningStep, ReasoningTrace, StepKind, TaskContext,
                TraceMetadata,
            };
            let trace = ReasoningTrace::new(
                new_entity_id(),
                vec![ReasoningStep::new(StepKind::Action, "a")],
                TraceMetadata {
                    extracted_at: Utc::now(),
                    conversation_length: 1,
                    step_count: 1,
                    has_explicit_markup: false,
                    session_id: "s".to_string(),
                    task_context: TaskContext {
                        goal: "g".to_string(),
                        input: "i".to_string(),
                        task_type: "t".to_string(),
                        domain: "d".to_string(),
                        complexity: Complexity::Low,
                    },
                },
            );
            MemoryPayload::from_parts(&trace, &Evaluation::new(0.5, 0.5, true), "c".to_string())
        };

        let insert_err = store
            .insert(EmbeddingVector::new(vec![0.0; 128], "m"), payload)
            .await
            .unwrap_err();
        assert!(matches!(
            insert_err,
            ReverieError::Storage(StorageError::NotConnected { ref collection })
                if collection == "reflection"
        ));

        let search_err = store
            .search(&EmbeddingVector::new(vec![0.0; 128], "m"), 5)
            .await
            .unwrap_err();
        assert!(matches!(
            search_err,
            ReverieError::Storage(StorageError::NotConnected { .. })
        ));
    }

    #[test]
    fn test_debug_hides_api_key_value() {
        let mut cfg = config();
        cfg.api_key = Some("secret-key".to_string());
        let store = RemoteVectorStore::new(cfg);
        let debug = format!("{:?}", store);
        assert!(!debug.contains("secret-key"));
    }
}
