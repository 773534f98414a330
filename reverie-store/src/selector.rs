//! Store selection with collection fallback

use crate::{VectorStore, VectorStoreManager};
use reverie_core::{ReverieError, ReverieResult, ServiceError};
use std::sync::Arc;

/// Resolve a concrete vector store for a preferred logical collection.
///
/// The preferred collection is an optional specialization; its absence must
/// never block the default persistence path. Resolution order:
/// 1. the store registered for `preferred`,
/// 2. the manager's default store,
/// 3. fail with `ServiceError::NoStoreAvailable`.
///
/// Exactly one resolution attempt is made per call - no retry across calls,
/// no caching of a failed resolution.
pub fn resolve_store(
    manager: &dyn VectorStoreManager,
    preferred: &str,
) -> ReverieResult<Arc<dyn VectorStore>> {
    manager
        .get_store(Some(preferred))
        .or_else(|| manager.get_store(None))
        .ok_or_else(|| {
            ReverieError::Service(ServiceError::NoStoreAvailable {
                collection: preferred.to_string(),
            })
        })
}

// =============================================================================
// TESTS
// =============================================================================
