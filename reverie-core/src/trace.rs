//! Reasoning trace entity types
//!
//! Pure data describing a captured reasoning episode. Traces are owned by
//! the caller; this subsystem treats them as read-only input.

use crate::{Timestamp, TraceId};
use serde::{Deserialize, Serialize};

// ============================================================================
// STEP TYPES
// ============================================================================

/// Kind of a single reasoning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Thought,
    Action,
    Observation,
}

impl StepKind {
    /// Convert to stable string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            StepKind::Thought => "thought",
            StepKind::Action => "action",
            StepKind::Observation => "observation",
        }
    }

    /// Parse from stable string representation.
    pub fn from_db_str(s: &str) -> Result<Self, StepKindParseError> {
        match s {
            "thought" => Ok(StepKind::Thought),
            "action" => Ok(StepKind::Action),
            "observation" => Ok(StepKind::Observation),
            _ => Err(StepKindParseError(s.to_string())),
        }
    }
}

/// Error parsing StepKind from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepKindParseError(pub String);

impl std::fmt::Display for StepKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid step kind: {}", self.0)
    }
}

impl std::error::Error for StepKindParseError {}

/// One step in a reasoning episode. Step order is chronological and
/// semantically meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub kind: StepKind,
    pub content: String,
}

impl ReasoningStep {
    pub fn new(kind: StepKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

// ============================================================================
// TASK CONTEXT
// ============================================================================

/// Complexity of the task a trace was captured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Convert to stable string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }

    /// Parse from stable string representation.
    pub fn from_db_str(s: &str) -> Result<Self, ComplexityParseError> {
        match s {
            "low" => Ok(Complexity::Low),
            "medium" => Ok(Complexity::Medium),
            "high" => Ok(Complexity::High),
            _ => Err(ComplexityParseError(s.to_string())),
        }
    }
}

/// Error parsing Complexity from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityParseError(pub String);

impl std::fmt::Display for ComplexityParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid complexity: {}", self.0)
    }
}

impl std::error::Error for ComplexityParseError {}

/// Descriptive context for the task a trace was captured during.
/// No invariant beyond `complexity` being one of the enumerated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskContext {
    pub goal: String,
    pub input: String,
    pub task_type: String,
    pub domain: String,
    pub complexity: Complexity,
}

// ============================================================================
// TRACE
// ============================================================================

/// Metadata attached to a captured trace.
///
/// `step_count` is advisory: it should equal `steps.len()` but upstream
/// extraction is trusted and a mismatch is never rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMetadata {
    pub extracted_at: Timestamp,
    pub conversation_length: u32,
    pub step_count: u32,
    pub has_explicit_markup: bool,
    pub session_id: String,
    pub task_context: TaskContext,
}

/// A captured reasoning episode: an ordered sequence of steps plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningTrace {
    pub trace_id: TraceId,
    pub steps: Vec<ReasoningStep>,
    pub metadata: TraceMetadata,
}

impl ReasoningTrace {
    pub fn new(trace_id: TraceId, steps: Vec<ReasoningStep>, metadata: TraceMetadata) -> Self {
        Self {
            trace_id,
            steps,
            metadata,
        }
    }

    /// A trace is structurally valid iff its step sequence is non-empty.
    /// All other fields are accepted as given.
    pub fn is_structurally_valid(&self) -> bool {
        !self.steps.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
