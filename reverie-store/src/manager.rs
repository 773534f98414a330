//! Vector store manager - named-collection registry

use crate::VectorStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry capability that resolves a collection hint to a concrete store.
///
/// `get_store(None)` yields the default store; `get_store(Some(name))` the
/// store registered for that named collection, if any. Absence is a normal
/// outcome, not an error - the selector owns fallback.
pub trait VectorStoreManager: Send + Sync {
    fn get_store(&self, collection: Option<&str>) -> Option<Arc<dyn VectorStore>>;
}

/// Store registry with a default store plus named specializations.
/// Stores must be explicitly registered - no auto-discovery.
pub struct StoreRegistry {
    /// Default store used when no collection hint matches.
    default: Option<Arc<dyn VectorStore>>,
    /// Specialized stores keyed by collection name.
    named: HashMap<String, Arc<dyn VectorStore>>,
}

impl StoreRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            default: None,
            named: HashMap::new(),
        }
    }

    /// Register the default store.
    /// Replaces any previously registered default.
    pub fn register_default(&mut self, store: Arc<dyn VectorStore>) {
        self.default = Some(store);
    }

    /// Register a store for a named collection.
    /// Replaces any previous registration for that name.
    pub fn register_collection(&mut self, name: impl Into<String>, store: Arc<dyn VectorStore>) {
        self.named.insert(name.into(), store);
    }

    /// Check if a default store is registered.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Names of registered specialized collections.
    pub fn collection_names(&self) -> Vec<&str> {
        self.named.keys().map(String::as_str).collect()
    }
}

impl VectorStoreManager for StoreRegistry {
    fn get_store(&self, collection: Option<&str>) -> Option<Arc<dyn VectorStore>> {
        match collection {
            Some(name) => self.named.get(name).cloned(),
            None => self.default.clone(),
        }
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("default", &self.default.is_some())
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
