//! Deterministic trace serialization for embedding

use reverie_core::ReasoningTrace;
use std::fmt::Write;

/// Serialize a trace into the single text representation that gets embedded.
///
/// Steps come first, in chronological order, followed by the task-context
/// metadata. The format is deterministic: the same trace always produces
/// the same text, so embeddings (and the embedding cache keyed by content
/// hash) are stable across calls.
pub fn serialize_trace(trace: &ReasoningTrace) -> String {
    let mut out = String::new();

    for step in &trace.steps {
        // Write to String cannot fail
        let _ = writeln!(out, "[{}] {}", step.kind.as_db_str(), step.content);
    }

    let ctx = &trace.metadata.task_context;
    let _ = writeln!(out, "goal: {}", ctx.goal);
    let _ = writeln!(out, "task_type: {}", ctx.task_type);
    let _ = writeln!(out, "domain: {}", ctx.domain);
    let _ = write!(out, "complexity: {}", ctx.complexity.as_db_str());

    out
}

// =============================================================================
// TESTS
// =============================================================================
