//! Reverie Test Utilities
//!
//! Centralized test infrastructure for the Reverie workspace:
//! - Mock embedding providers and vector stores with call accounting
//! - Proptest generators for traces and evaluations
//! - Test fixtures for common scenarios

// Re-export core types for convenience
pub use reverie_core::{
    new_entity_id, Complexity, EmbeddingError, EmbeddingVector, Evaluation, MemoryPayload,
    ReasoningStep, ReasoningTrace, ReverieError, ReverieResult, ServiceError, StepKind,
    StorageError, StoredMemoryRecord, TaskContext, TraceMetadata, ValidationError, VectorId,
};

pub use reverie_embed::EmbeddingProvider;
pub use reverie_store::{
    CollectionInfo, CollectionStatus, InMemoryVectorStore, SearchMatch, StoreRegistry,
    VectorStore, VectorStoreManager,
};

use async_trait::async_trait;
use chrono::Utc;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

// ============================================================================
// MOCK EMBEDDING PROVIDERS
// ============================================================================

/// Mock embedding provider for testing.
///
/// Embeddings are a normalized byte-fold of the input text: fully
/// deterministic, so identical inputs always produce identical vectors.
/// Counts embed calls so tests can assert how often it was consulted.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    model_id: String,
    dimensions: i32,
    embed_calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub fn new(model_id: impl Into<String>, dimensions: i32) -> Self {
        Self {
            model_id: model_id.into(),
            dimensions,
            embed_calls: AtomicUsize::new(0),
        }
    }

    /// Number of embed calls made (batch calls count once per text).
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::Relaxed)
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        if self.dimensions <= 0 {
            return Vec::new();
        }
        let mut data = vec![0.0f32; self.dimensions as usize];

        for (i, byte) in text.bytes().enumerate() {
            let idx = i % self.dimensions as usize;
            data[idx] += (byte as f32) / 255.0;
        }

        let norm: f32 = data.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut data {
                *x /= norm;
            }
        }

        data
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> ReverieResult<EmbeddingVector> {
        self.embed_calls.fetch_add(1, Ordering::Relaxed);
        let data = self.generate_embedding(text);
        Ok(EmbeddingVector::new(data, self.model_id.clone()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> ReverieResult<Vec<EmbeddingVector>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    fn dimensions(&self) -> i32 {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Embedding provider that always fails.
#[derive(Debug, Clone)]
pub struct FailingEmbeddingProvider {
    reason: String,
}

impl FailingEmbeddingProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbeddingProvider {
    async fn embed(&self, _text: &str) -> ReverieResult<EmbeddingVector> {
        Err(ReverieError::Embedding(EmbeddingError::EmbeddingFailed {
            reason: self.reason.clone(),
        }))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> ReverieResult<Vec<EmbeddingVector>> {
        Err(ReverieError::Embedding(EmbeddingError::EmbeddingFailed {
            reason: self.reason.clone(),
        }))
    }

    fn dimensions(&self) -> i32 {
        0
    }

    fn model_id(&self) -> &str {
        "failing"
    }
}

// ============================================================================
// MOCK VECTOR STORE
// ============================================================================

/// Mock vector store with call accounting.
///
/// Counts inserts and captures payloads so tests can assert exactly how many
/// side effects occurred. Can be configured to fail every insert.
pub struct MockVectorStore {
    collection: String,
    dimensions: i32,
    fail_inserts: bool,
    insert_calls: AtomicUsize,
    search_calls: AtomicUsize,
    inserted: RwLock<Vec<MemoryPayload>>,
}

impl MockVectorStore {
    pub fn new(collection: impl Into<String>, dimensions: i32) -> Self {
        Self {
            collection: collection.into(),
            dimensions,
            fail_inserts: false,
            insert_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            inserted: RwLock::new(Vec::new()),
        }
    }

    /// Configure the store so every insert fails after being counted.
    pub fn failing(collection: impl Into<String>, dimensions: i32) -> Self {
        let mut store = Self::new(collection, dimensions);
        store.fail_inserts = true;
        store
    }

    /// Number of insert calls made (including failed ones).
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::Relaxed)
    }

    /// Number of search calls made.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::Relaxed)
    }

    /// Payloads successfully inserted, in call order.
    pub fn inserted_payloads(&self) -> Vec<MemoryPayload> {
        self.inserted.read().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn insert(
        &self,
        embedding: EmbeddingVector,
        payload: MemoryPayload,
    ) -> ReverieResult<VectorId> {
        self.insert_calls.fetch_add(1, Ordering::Relaxed);

        if self.fail_inserts {
            return Err(ReverieError::Storage(StorageError::InsertFailed {
                collection: self.collection.clone(),
                reason: "mock store configured to fail".to_string(),
            }));
        }
        if embedding.dimensions != self.dimensions {
            return Err(ReverieError::Storage(StorageError::DimensionMismatch {
                expected: self.dimensions,
                got: embedding.dimensions,
            }));
        }

        if let Ok(mut inserted) = self.inserted.write() {
            inserted.push(payload);
        }
        Ok(new_entity_id())
    }

    async fn search(
        &self,
        _query: &EmbeddingVector,
        _limit: usize,
    ) -> ReverieResult<Vec<SearchMatch>> {
        self.search_calls.fetch_add(1, Ordering::Relaxed);
        Ok(Vec::new())
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
            count: self.inserted.read().map(|p| p.len()).unwrap_or(0),
            status: CollectionStatus::Ok,
        })
    }
}

impl std::fmt::Debug for MockVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockVectorStore")
            .field("collection", &self.collection)
            .field("dimensions", &self.dimensions)
            .field("fail_inserts", &self.fail_inserts)
            .field("insert_calls", &self.insert_calls())
            .finish()
    }
}

// ============================================================================
// MOCK STORE MANAGER
// ============================================================================

/// Mock store manager that records every collection hint it is queried with.
pub struct MockStoreManager {
    reflection: Option<Arc<dyn VectorStore>>,
    default: Option<Arc<dyn VectorStore>>,
    requested: RwLock<Vec<Option<String>>>,
}

impl MockStoreManager {
    pub fn new(
        reflection: Option<Arc<dyn VectorStore>>,
        default: Option<Arc<dyn VectorStore>>,
    ) -> Self {
        Self {
            reflection,
            default,
            requested: RwLock::new(Vec::new()),
        }
    }

    /// Collection hints this manager was queried with, in call order.
    pub fn requested_hints(&self) -> Vec<Option<String>> {
        self.requested.read().map(|r| r.clone()).unwrap_or_default()
    }
}

impl VectorStoreManager for MockStoreManager {
    fn get_store(&self, collection: Option<&str>) -> Option<Arc<dyn VectorStore>> {
        if let Ok(mut requested) = self.requested.write() {
            requested.push(collection.map(String::from));
        }
        match collection {
            Some("reflection") => self.reflection.clone(),
            Some(_) => None,
            None => self.default.clone(),
        }
    }
}

impl std::fmt::Debug for MockStoreManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStoreManager")
            .field("reflection", &self.reflection.is_some())
            .field("default", &self.default.is_some())
            .finish()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A realistic two-step trace for write-path tests.
pub fn sample_trace() -> ReasoningTrace {
    ReasoningTrace::new(
        new_entity_id(),
        vec![
            ReasoningStep::new(
                StepKind::Thought,
                "I need to analyze this problem step by step",
            ),
            ReasoningStep::new(StepKind::Action, "First, I will examine the code structure"),
        ],
        TraceMetadata {
            extracted_at: Utc::now(),
            conversation_length: 5,
            step_count: 2,
            has_explicit_markup: true,
            session_id: "test-session".to_string(),
            task_context: TaskContext {
                goal: "Analyze code structure".to_string(),
                input: "How to implement a feature".to_string(),
                task_type: "code_analysis".to_string(),
                domain: "programming".to_string(),
                complexity: Complexity::Medium,
            },
        },
    )
}

/// A passing evaluation for the sample trace.
pub fn sample_evaluation() -> Evaluation {
    Evaluation {
        quality_score: 0.8,
        efficiency_score: 0.7,
        issues: Vec::new(),
        suggestions: vec!["Consider adding more detailed analysis".to_string()],
        should_store: true,
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

prop_compose! {
    /// Generate an arbitrary step kind.
    pub fn arb_step_kind()(idx in 0..3usize) -> StepKind {
        [StepKind::Thought, StepKind::Action, StepKind::Observation][idx]
    }
}

prop_compose! {
    /// Generate an arbitrary reasoning step.
    pub fn arb_step()(
        kind in arb_step_kind(),
        content in "[a-zA-Z0-9 .,]{1,80}",
    ) -> ReasoningStep {
        ReasoningStep::new(kind, content)
    }
}

prop_compose! {
    /// Generate an arbitrary complexity.
    pub fn arb_complexity()(idx in 0..3usize) -> Complexity {
        [Complexity::Low, Complexity::Medium, Complexity::High][idx]
    }
}

prop_compose! {
    /// Generate an arbitrary trace with 1..12 steps.
    pub fn arb_trace()(
        steps in proptest::collection::vec(arb_step(), 1..12),
        conversation_length in 0u32..100,
        has_explicit_markup in any::<bool>(),
        session in "[a-z0-9-]{4,20}",
        goal in "[a-zA-Z ]{1,40}",
        complexity in arb_complexity(),
    ) -> ReasoningTrace {
        let step_count = steps.len() as u32;
        ReasoningTrace::new(
            new_entity_id(),
            steps,
            TraceMetadata {
                extracted_at: Utc::now(),
                conversation_length,
                step_count,
                has_explicit_markup,
                session_id: session,
                task_context: TaskContext {
                    goal,
                    input: "input".to_string(),
                    task_type: "task".to_string(),
                    domain: "domain".to_string(),
                    complexity,
                },
            },
        )
    }
}

prop_compose! {
    /// Generate an arbitrary evaluation.
    pub fn arb_evaluation()(
        quality_score in 0.0f32..=1.0,
        efficiency_score in 0.0f32..=1.0,
        should_store in any::<bool>(),
    ) -> Evaluation {
        Evaluation::new(quality_score, efficiency_score, should_store)
    }
}

// =============================================================================
// TESTS
// =============================================================================
