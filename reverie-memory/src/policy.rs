//! Storage policy - the quality gate

use reverie_core::Evaluation;

/// Fixed skip reason reported back to the caller.
pub const QUALITY_THRESHOLD_MESSAGE: &str =
    "Reasoning trace did not meet quality threshold for storage";

/// Outcome of the storage policy for one (trace, evaluation) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageDecision {
    /// Persist the trace.
    Store,
    /// Do not persist; carries the reason reported to the caller.
    Skip { reason: String },
}

/// Decide whether an evaluated trace should be persisted.
///
/// Pure function over the evaluation. `should_store` is the sole gate:
/// scoring policy lives upstream in the evaluator, and an evaluator-level
/// override beats any numeric heuristic in both directions. The numeric
/// scores are never consulted here.
pub fn decide(evaluation: &Evaluation) -> StorageDecision {
    if evaluation.should_store {
        StorageDecision::Store
    } else {
        StorageDecision::Skip {
            reason: QUALITY_THRESHOLD_MESSAGE.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
