//! Structured write outcome returned to the caller

use reverie_core::{ReverieError, VectorId};
use serde::{Deserialize, Serialize};

/// Detail of a write-memory call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    /// Whether a record was persisted.
    pub stored: bool,
    /// Identifier assigned by the store, present iff `stored`.
    pub vector_id: Option<VectorId>,
    /// Collection the record was written to, present iff `stored`.
    pub collection: Option<String>,
    /// Human-readable note (e.g. the skip reason).
    pub message: Option<String>,
    /// Human-readable error string, present iff the call failed.
    pub error: Option<String>,
}

/// Outcome of a write-memory call.
///
/// Expected failure modes are recovered into this value; the orchestrator
/// never raises an uncaught fault for them. Skip-by-policy is a success
/// with `stored = false`, distinct from every error kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteReport {
    pub success: bool,
    pub result: WriteResult,
}

impl WriteReport {
    /// A record was persisted.
    pub fn stored(vector_id: VectorId, collection: impl Into<String>) -> Self {
        Self {
            success: true,
            result: WriteResult {
                stored: true,
                vector_id: Some(vector_id),
                collection: Some(collection.into()),
                message: None,
                error: None,
            },
        }
    }

    /// The policy decided not to persist. This is the expected happy path
    /// for low-value traces, not an error.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            result: WriteResult {
                stored: false,
                vector_id: None,
                collection: None,
                message: Some(reason.into()),
                error: None,
            },
        }
    }

    /// The call failed with an expected error.
    pub fn failed(error: &ReverieError) -> Self {
        Self {
            success: false,
            result: WriteResult {
                stored: false,
                vector_id: None,
                collection: None,
                message: None,
                error: Some(error.to_string()),
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
