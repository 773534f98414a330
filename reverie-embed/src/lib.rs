//! Reverie Embed - Embedding Capability
//!
//! Provider-agnostic trait for converting text into embedding vectors.
//! The write orchestrator depends only on this trait; concrete providers
//! (OpenAI, test doubles) implement it.

pub mod providers;

use async_trait::async_trait;
use reverie_core::{
    compute_content_hash, ContentHash, EmbeddingError, EmbeddingVector, ReverieError,
    ReverieResult,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ============================================================================
// EMBEDDING PROVIDER TRAIT
// ============================================================================

/// Trait for embedding providers.
/// Implementations must be thread-safe (Send + Sync) and safe for concurrent
/// use; the write path holds no locks around calls into them.
///
/// # Example
/// ```ignore
/// struct OpenAiEmbedding { /* ... */ }
///
/// #[async_trait]
/// impl EmbeddingProvider for OpenAiEmbedding {
///     async fn embed(&self, text: &str) -> ReverieResult<EmbeddingVector> {
///         // Call OpenAI API
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    ///
    /// # Returns
    /// * `Ok(EmbeddingVector)` - The embedding vector
    /// * `Err(ReverieError::Embedding)` - If embedding fails
    async fn embed(&self, text: &str) -> ReverieResult<EmbeddingVector>;

    /// Generate embeddings for multiple texts in a batch.
    /// More efficient than calling embed() multiple times.
    async fn embed_batch(&self, texts: &[&str]) -> ReverieResult<Vec<EmbeddingVector>>;

    /// Get the number of dimensions this provider produces.
    fn dimensions(&self) -> i32;

    /// Get the model identifier for this provider.
    fn model_id(&self) -> &str;
}

impl std::fmt::Debug for dyn EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("model_id", &self.model_id())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

// ============================================================================
// PROVIDER REGISTRY
// ============================================================================

/// Registry for the embedding provider.
/// Providers must be explicitly registered - no auto-discovery.
pub struct ProviderRegistry {
    /// Registered embedding provider (optional)
    embedding: Option<Arc<dyn EmbeddingProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty provider registry.
    /// No provider is registered by default.
    pub fn new() -> Self {
        Self { embedding: None }
    }

    /// Register an embedding provider.
    /// Replaces any previously registered provider.
    pub fn register_embedding(&mut self, provider: Box<dyn EmbeddingProvider>) {
        self.embedding = Some(Arc::from(provider));
    }

    /// Get the registered embedding provider.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn EmbeddingProvider>)` - Handle to the provider
    /// * `Err(ReverieError::Embedding(EmbeddingError::ProviderNotConfigured))` - If none registered
    pub fn embedding(&self) -> ReverieResult<Arc<dyn EmbeddingProvider>> {
        self.embedding
            .clone()
            .ok_or(ReverieError::Embedding(EmbeddingError::ProviderNotConfigured))
    }

    /// Check if an embedding provider is registered.
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    /// Clear the embedding provider registration.
    pub fn clear_embedding(&mut self) {
        self.embedding = None;
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("embedding", &self.embedding.is_some())
            .finish()
    }
}

// ============================================================================
// EMBEDDING CACHE
// ============================================================================

/// Cache for embedding vectors to avoid redundant API calls.
/// Keyed by content hash; trace serialization is deterministic, so the hash
/// is a stable key for identical traces. Thread-safe via RwLock.
pub struct EmbeddingCache {
    /// Cache storage: content hash -> embedding
    cache: RwLock<HashMap<ContentHash, EmbeddingVector>>,
    /// Maximum number of entries
    max_size: usize,
}

impl EmbeddingCache {
    /// Create a new embedding cache with specified maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            max_size,
        }
    }

    /// Get a cached embedding by content hash.
    pub fn get(&self, hash: &ContentHash) -> Option<EmbeddingVector> {
        self.cache.read().ok()?.get(hash).cloned()
    }

    /// Insert an embedding into the cache.
    /// If the cache is full, this is a no-op (simple eviction strategy).
    pub fn insert(&self, hash: ContentHash, embedding: EmbeddingVector) {
        if let Ok(mut cache) = self.cache.write() {
            if cache.len() < self.max_size {
                cache.insert(hash, embedding);
            }
        }
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Get the current number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("max_size", &self.max_size)
            .field("current_size", &self.len())
            .finish()
    }
}

// ============================================================================
// CACHING PROVIDER
// ============================================================================

/// Embedding provider that consults a content-hash cache before its inner
/// provider. Identical text embeds once; later calls for the same content
/// are served from the cache without touching the inner provider.
pub struct CachingEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    cache: EmbeddingCache,
}

impl CachingEmbeddingProvider {
    /// Wrap a provider with a cache bounded to `max_cache_size` entries.
    pub fn new(inner: Arc<dyn EmbeddingProvider>, max_cache_size: usize) -> Self {
        Self {
            inner,
            cache: EmbeddingCache::new(max_cache_size),
        }
    }

    /// Number of embeddings currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl EmbeddingProvider for CachingEmbeddingProvider {
    async fn embed(&self, text: &str) -> ReverieResult<EmbeddingVector> {
        let hash = compute_content_hash(text.as_bytes());
        if let Some(hit) = self.cache.get(&hash) {
            return Ok(hit);
        }
        let embedding = self.inner.embed(text).await?;
        self.cache.insert(hash, embedding.clone());
        Ok(embedding)
    }

    /// Batches go through element-wise so each text hits or misses on its own.
    async fn embed_batch(&self, texts: &[&str]) -> ReverieResult<Vec<EmbeddingVector>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> i32 {
        self.inner.dimensions()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

impl std::fmt::Debug for CachingEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingEmbeddingProvider")
            .field("model_id", &self.inner.model_id())
            .field("cached", &self.cache.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
