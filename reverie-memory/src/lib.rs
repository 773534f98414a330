//! Reverie Memory - Quality-Gated Write Orchestration
//!
//! The core control flow of the reasoning-memory store: validate the input
//! trace, apply the storage policy, embed the trace, resolve a vector store
//! (preferring the reflection collection, falling back to the default), and
//! perform the insert. Every expected failure mode is recovered into a
//! structured [`WriteReport`].

pub mod policy;
pub mod report;
pub mod serialize;

pub use policy::{decide, StorageDecision, QUALITY_THRESHOLD_MESSAGE};
pub use report::{WriteReport, WriteResult};
pub use serialize::serialize_trace;

use reverie_core::{
    Evaluation, MemoryPayload, ReasoningTrace, ReverieError, ReverieResult, ServiceError,
    ValidationError, VectorId,
};
use reverie_embed::{EmbeddingProvider, ProviderRegistry};
use reverie_store::{resolve_store, VectorStoreManager};
use std::sync::Arc;

/// Preferred logical collection for self-reflective reasoning traces.
/// An optional specialization; deployments without it use the default store.
pub const REFLECTION_COLLECTION: &str = "reflection";

// ============================================================================
// SERVICES CONTEXT
// ============================================================================

/// Capabilities the write path needs, passed explicitly by the caller.
///
/// Both capabilities must be present for any write to proceed; a partial
/// context fails the call before any other work. The handles are shared and
/// must be safe for concurrent use by their own contract - this subsystem
/// adds no locking of its own.
pub struct MemoryServices {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    stores: Option<Arc<dyn VectorStoreManager>>,
}

impl MemoryServices {
    /// Create a fully populated services context.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        stores: Arc<dyn VectorStoreManager>,
    ) -> Self {
        Self {
            embedder: Some(embedder),
            stores: Some(stores),
        }
    }

    /// Create an empty context. Useful for incremental wiring and tests.
    pub fn empty() -> Self {
        Self {
            embedder: None,
            stores: None,
        }
    }

    /// Build a services context from a provider registry and a store manager.
    /// Fails with `EmbeddingError::ProviderNotConfigured` when the registry
    /// holds no embedder.
    pub fn from_registry(
        registry: &ProviderRegistry,
        stores: Arc<dyn VectorStoreManager>,
    ) -> ReverieResult<Self> {
        Ok(Self::new(registry.embedding()?, stores))
    }

    /// Set the embedding capability.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store manager capability.
    pub fn with_stores(mut self, stores: Arc<dyn VectorStoreManager>) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Both capabilities, or `ServiceError::ContextMissing`.
    fn require(
        &self,
    ) -> ReverieResult<(Arc<dyn EmbeddingProvider>, Arc<dyn VectorStoreManager>)> {
        match (&self.embedder, &self.stores) {
            (Some(embedder), Some(stores)) => Ok((embedder.clone(), stores.clone())),
            _ => Err(ReverieError::Service(ServiceError::ContextMissing)),
        }
    }
}

impl std::fmt::Debug for MemoryServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryServices")
            .field("embedder", &self.embedder.is_some())
            .field("stores", &self.stores.is_some())
            .finish()
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Internal typed outcome before it is flattened into a report.
enum WriteOutcome {
    Stored {
        vector_id: VectorId,
        collection: String,
    },
    Skipped {
        reason: String,
    },
}

/// Store an evaluated reasoning trace, applying the quality gate.
///
/// Control flow, in order:
/// 1. service availability check (both capabilities required),
/// 2. structural validation (non-empty steps),
/// 3. policy decision (skip is a successful outcome, not an error),
/// 4. embedding,
/// 5. store resolution (reflection collection, default fallback),
/// 6. insert,
/// 7. result assembly.
///
/// Side effects are confined to the insert: any failure before it leaves no
/// persisted record. There is no retry here - the caller owns retry policy.
pub async fn store_reasoning_memory(
    trace: &ReasoningTrace,
    evaluation: &Evaluation,
    services: &MemoryServices,
) -> WriteReport {
    match write_memory(trace, evaluation, services).await {
        Ok(WriteOutcome::Stored {
            vector_id,
            collection,
        }) => {
            tracing::info!(
                trace_id = %trace.trace_id,
                vector_id = %vector_id,
                collection = %collection,
                "Stored reasoning memory"
            );
            WriteReport::stored(vector_id, collection)
        }
        Ok(WriteOutcome::Skipped { reason }) => {
            tracing::debug!(
                trace_id = %trace.trace_id,
                quality_score = evaluation.quality_score,
                "Skipped reasoning memory: {}",
                reason
            );
            WriteReport::skipped(reason)
        }
        Err(error) => {
            tracing::warn!(
                trace_id = %trace.trace_id,
                error = %error,
                "Failed to store reasoning memory"
            );
            WriteReport::failed(&error)
        }
    }
}

async fn write_memory(
    trace: &ReasoningTrace,
    evaluation: &Evaluation,
    services: &MemoryServices,
) -> ReverieResult<WriteOutcome> {
    let (embedder, stores) = services.require()?;

    if !trace.is_structurally_valid() {
        return Err(ReverieError::Validation(ValidationError::EmptySteps));
    }

    let reason = match decide(evaluation) {
        StorageDecision::Store => None,
        StorageDecision::Skip { reason } => Some(reason),
    };
    if let Some(reason) = reason {
        return Ok(WriteOutcome::Skipped { reason });
    }

    let content = serialize_trace(trace);
    let embedding = embedder.embed(&content).await?;
    tracing::debug!(
        trace_id = %trace.trace_id,
        model_id = %embedding.model_id,
        dimensions = embedding.dimensions,
        "Embedded reasoning trace"
    );

    let store = resolve_store(stores.as_ref(), REFLECTION_COLLECTION)?;
    let collection = store.collection_name().to_string();

    let payload = MemoryPayload::from_parts(trace, evaluation, content);
    let vector_id = store.insert(embedding, payload).await?;

    Ok(WriteOutcome::Stored {
        vector_id,
        collection,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_test_utils::{
        sample_evaluation, sample_trace, FailingEmbeddingProvider, InMemoryVectorStore,
        MockEmbeddingProvider, MockStoreManager, MockVectorStore,
    };
    use std::sync::Arc;

    const DIMS: i32 = 128;

    fn full_services() -> (
        Arc<MockEmbeddingProvider>,
        Arc<MockVectorStore>,
        Arc<MockVectorStore>,
        MemoryServices,
    ) {
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
        let reflection = Arc::new(MockVectorStore::new("reflection", DIMS));
        let default = Arc::new(MockVectorStore::new("memories", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            Some(reflection.clone() as Arc<dyn reverie_store::VectorStore>),
            Some(default.clone() as Arc<dyn reverie_store::VectorStore>),
        ));
        let services = MemoryServices::new(embedder.clone(), manager);
        (embedder, reflection, default, services)
    }

    #[tokio::test]
    async fn test_stores_high_quality_reasoning() {
        let (embedder, reflection, default, services) = full_services();
        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(report.success);
        assert!(report.result.stored);
        assert!(report.result.vector_id.is_some());
        assert_eq!(report.result.collection.as_deref(), Some("reflection"));
        assert_eq!(embedder.embed_calls(), 1);
        assert_eq!(reflection.insert_calls(), 1);
        assert_eq!(default.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_skips_storage_when_flag_is_false() {
        let (embedder, reflection, default, services) = full_services();
        let mut evaluation = sample_evaluation();
        evaluation.should_store = false;

        let report = store_reasoning_memory(&sample_trace(), &evaluation, &services).await;

        assert!(report.success);
        assert!(!report.result.stored);
        assert!(report
            .result
            .message
            .as_deref()
            .unwrap()
            .contains("quality threshold"));
        assert_eq!(embedder.embed_calls(), 0);
        assert_eq!(reflection.insert_calls(), 0);
        assert_eq!(default.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_stores_when_flag_true_regardless_of_score() {
        let (_, reflection, _, services) = full_services();
        let mut evaluation = sample_evaluation();
        evaluation.quality_score = 0.0;
        evaluation.should_store = true;

        let report = store_reasoning_memory(&sample_trace(), &evaluation, &services).await;

        assert!(report.success);
        assert!(report.result.stored);
        assert_eq!(reflection.insert_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_steps_fail_validation() {
        let (embedder, reflection, default, services) = full_services();
        let mut trace = sample_trace();
        trace.steps.clear();

        let report = store_reasoning_memory(&trace, &sample_evaluation(), &services).await;

        assert!(!report.success);
        assert!(!report.result.stored);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("steps array is empty"));
        assert_eq!(embedder.embed_calls(), 0);
        assert_eq!(reflection.insert_calls(), 0);
        assert_eq!(default.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_policy() {
        // An invalid trace fails even when the policy would have skipped.
        let (_, _, _, services) = full_services();
        let mut trace = sample_trace();
        trace.steps.clear();
        let mut evaluation = sample_evaluation();
        evaluation.should_store = false;

        let report = store_reasoning_memory(&trace, &evaluation, &services).await;

        assert!(!report.success);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("steps array is empty"));
    }

    #[tokio::test]
    async fn test_missing_services_context_fails_first() {
        let services = MemoryServices::empty();
        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(!report.success);
        assert!(!report.result.stored);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("Services context is required"));
    }

    #[tokio::test]
    async fn test_partial_services_context_fails() {
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
        let services = MemoryServices::empty().with_embedder(embedder.clone());

        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(!report.success);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("Services context is required"));
        // Fails before any embedding work.
        assert_eq!(embedder.embed_calls(), 0);
    }

    #[tokio::test]
    async fn test_service_precheck_precedes_validation() {
        // Even an invalid trace reports the missing context, not validation.
        let mut trace = sample_trace();
        trace.steps.clear();

        let report =
            store_reasoning_memory(&trace, &sample_evaluation(), &MemoryServices::empty()).await;

        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("Services context is required"));
    }

    #[tokio::test]
    async fn test_falls_back_to_default_store() {
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
        let default = Arc::new(MockVectorStore::new("memories", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            None,
            Some(default.clone() as Arc<dyn reverie_store::VectorStore>),
        ));
        let services = MemoryServices::new(embedder, manager.clone());

        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(report.success);
        assert!(report.result.stored);
        assert_eq!(report.result.collection.as_deref(), Some("memories"));
        assert_eq!(default.insert_calls(), 1);
        // The reflection collection was asked for first.
        assert_eq!(
            manager.requested_hints(),
            vec![Some("reflection".to_string()), None]
        );
    }

    #[tokio::test]
    async fn test_no_store_resolvable_fails_without_insert() {
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
        let manager = Arc::new(MockStoreManager::new(None, None));
        let services = MemoryServices::new(embedder, manager);

        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(!report.success);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("No vector store available"));
    }

    #[tokio::test]
    async fn test_embedding_failure_prevents_insert() {
        let embedder = Arc::new(FailingEmbeddingProvider::new("upstream unavailable"));
        let reflection = Arc::new(MockVectorStore::new("reflection", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            Some(reflection.clone() as Arc<dyn reverie_store::VectorStore>),
            None,
        ));
        let services = MemoryServices::new(embedder, manager);

        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(!report.success);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("Embedding failed"));
        assert_eq!(reflection.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_is_reported() {
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
        let reflection = Arc::new(MockVectorStore::failing("reflection", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            Some(reflection.clone() as Arc<dyn reverie_store::VectorStore>),
            None,
        ));
        let services = MemoryServices::new(embedder, manager);

        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(!report.success);
        assert!(!report.result.stored);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("Insert failed"));
        assert_eq!(reflection.insert_calls(), 1);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_surfaces_as_storage_error() {
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", 64));
        let reflection = Arc::new(MockVectorStore::new("reflection", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            Some(reflection as Arc<dyn reverie_store::VectorStore>),
            None,
        ));
        let services = MemoryServices::new(embedder, manager);

        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(!report.success);
        assert!(report
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("Dimension mismatch"));
    }

    #[tokio::test]
    async fn test_skip_happens_before_embedding() {
        // A failing embedder is never consulted when the policy skips.
        let embedder = Arc::new(FailingEmbeddingProvider::new("should not be called"));
        let manager = Arc::new(MockStoreManager::new(None, None));
        let services = MemoryServices::new(embedder, manager);

        let mut evaluation = sample_evaluation();
        evaluation.should_store = false;

        let report = store_reasoning_memory(&sample_trace(), &evaluation, &services).await;
        assert!(report.success);
        assert!(!report.result.stored);
    }

    #[tokio::test]
    async fn test_repeat_writes_produce_identical_content_hash() {
        // Deterministic serialization: the same trace embeds to the same
        // content, so both records carry the same dedup hash.
        let embedder = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
        let store = Arc::new(InMemoryVectorStore::new("reflection", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            Some(store.clone() as Arc<dyn reverie_store::VectorStore>),
            None,
        ));
        let services = MemoryServices::new(embedder, manager);

        let trace = sample_trace();
        let evaluation = sample_evaluation();

        let first = store_reasoning_memory(&trace, &evaluation, &services).await;
        let second = store_reasoning_memory(&trace, &evaluation, &services).await;

        let a = store.get(first.result.vector_id.unwrap()).unwrap();
        let b = store.get(second.result.vector_id.unwrap()).unwrap();
        assert_eq!(a.payload.content_hash, b.payload.content_hash);
        assert_eq!(a.embedding, b.embedding);
        assert_ne!(a.vector_id, b.vector_id);
    }

    #[tokio::test]
    async fn test_identical_trace_embeds_once_through_cache() {
        // With the caching wrapper in the services context, a second write of
        // the same trace is served from the cache instead of re-embedding.
        let inner = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
        let embedder = Arc::new(reverie_embed::CachingEmbeddingProvider::new(
            inner.clone() as Arc<dyn EmbeddingProvider>,
            16,
        ));
        let store = Arc::new(InMemoryVectorStore::new("reflection", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            Some(store.clone() as Arc<dyn reverie_store::VectorStore>),
            None,
        ));
        let services = MemoryServices::new(embedder.clone(), manager);

        let trace = sample_trace();
        let evaluation = sample_evaluation();

        let first = store_reasoning_memory(&trace, &evaluation, &services).await;
        let second = store_reasoning_memory(&trace, &evaluation, &services).await;

        assert!(first.success && second.success);
        assert_eq!(store.len(), 2);
        assert_eq!(inner.embed_calls(), 1);
        assert_eq!(embedder.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_services_built_from_provider_registry() {
        let mut registry = reverie_embed::ProviderRegistry::new();
        registry.register_embedding(Box::new(MockEmbeddingProvider::new("mock", DIMS)));
        let reflection = Arc::new(MockVectorStore::new("reflection", DIMS));
        let manager = Arc::new(MockStoreManager::new(
            Some(reflection.clone() as Arc<dyn reverie_store::VectorStore>),
            None,
        ));

        let services = MemoryServices::from_registry(&registry, manager).unwrap();
        let report =
            store_reasoning_memory(&sample_trace(), &sample_evaluation(), &services).await;

        assert!(report.success);
        assert_eq!(reflection.insert_calls(), 1);
    }

    #[test]
    fn test_services_from_empty_registry_fails() {
        let registry = reverie_embed::ProviderRegistry::new();
        let manager = Arc::new(MockStoreManager::new(None, None));
        let err = MemoryServices::from_registry(&registry, manager).unwrap_err();
        assert!(matches!(
            err,
            ReverieError::Embedding(reverie_core::EmbeddingError::ProviderNotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_payload_carries_trace_and_evaluation_fields() {
        let (_, reflection, _, services) = full_services();
        let trace = sample_trace();
        let evaluation = sample_evaluation();

        store_reasoning_memory(&trace, &evaluation, &services).await;

        let payloads = reflection.inserted_payloads();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].trace_id, trace.trace_id);
        assert_eq!(payloads[0].step_count, 2);
        assert_eq!(payloads[0].quality_score, evaluation.quality_score);
        assert!(payloads[0].content.contains("analyze this problem"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use reverie_test_utils::{arb_evaluation, arb_trace};

        fn run<F: std::future::Future>(future: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime")
                .block_on(future)
        }

        proptest! {
            #[test]
            fn prop_stored_iff_should_store(
                trace in arb_trace(),
                evaluation in arb_evaluation(),
            ) {
                let embedder = Arc::new(MockEmbeddingProvider::new("mock", DIMS));
                let reflection = Arc::new(MockVectorStore::new("reflection", DIMS));
                let manager = Arc::new(MockStoreManager::new(
                    Some(reflection.clone() as Arc<dyn reverie_store::VectorStore>),
                    None,
                ));
                let services = MemoryServices::new(embedder, manager);

                let report = run(store_reasoning_memory(&trace, &evaluation, &services));

                // Valid trace + full services: outcome tracks the flag alone.
                prop_assert!(report.success);
                prop_assert_eq!(report.result.stored, evaluation.should_store);
                let expected_inserts = if evaluation.should_store { 1 } else { 0 };
                prop_assert_eq!(reflection.insert_calls(), expected_inserts);
            }

            #[test]
            fn prop_failures_never_insert(
                trace in arb_trace(),
                evaluation in arb_evaluation(),
            ) {
                // Embedding always fails: no insert may ever happen.
                let embedder = Arc::new(FailingEmbeddingProvider::new("down"));
                let reflection = Arc::new(MockVectorStore::new("reflection", DIMS));
                let manager = Arc::new(MockStoreManager::new(
                    Some(reflection.clone() as Arc<dyn reverie_store::VectorStore>),
                    None,
                ));
                let services = MemoryServices::new(embedder, manager);

                let report = run(store_reasoning_memory(&trace, &evaluation, &services));

                prop_assert!(!report.result.stored);
                prop_assert_eq!(reflection.insert_calls(), 0);
            }
        }
    }
}
