//! Trace quality evaluation

use serde::{Deserialize, Serialize};

/// Quality assessment of a reasoning trace, produced upstream by an
/// evaluator.
///
/// The numeric scores are informational only. `should_store` is the sole
/// gate the write path consults: threshold comparison is the evaluator's
/// responsibility before setting the flag, not the memory subsystem's.
/// Scores are accepted as given and never clamped or re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Overall quality in [0, 1], per the evaluator's own scale.
    pub quality_score: f32,
    /// Efficiency in [0, 1], per the evaluator's own scale.
    pub efficiency_score: f32,
    /// Problems the evaluator found in the trace.
    pub issues: Vec<String>,
    /// Improvement suggestions from the evaluator.
    pub suggestions: Vec<String>,
    /// Explicit persistence decision. Takes precedence over any score.
    pub should_store: bool,
}

impl Evaluation {
    pub fn new(quality_score: f32, efficiency_score: f32, should_store: bool) -> Self {
        Self {
            quality_score,
            efficiency_score,
            issues: Vec::new(),
            suggestions: Vec::new(),
            should_store,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_scores_and_flag() {
        let eval = Evaluation::new(0.8, 0.7, true);
        assert_eq!(eval.quality_score, 0.8);
        assert_eq!(eval.efficiency_score, 0.7);
        assert!(eval.should_store);
        assert!(eval.issues.is_empty());
        assert!(eval.suggestions.is_empty());
    }

    #[test]
    fn test_out_of_range_scores_are_accepted() {
        // Upstream metadata ranges are not re-validated here.
        let eval = Evaluation::new(1.7, -0.2, false);
        assert_eq!(eval.quality_score, 1.7);
        assert_eq!(eval.efficiency_score, -0.2);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut eval = Evaluation::new(0.3, 0.9, true);
        eval.issues.push("circular reasoning".to_string());
        eval.suggestions.push("add more detail".to_string());
        let json = serde_json::to_string(&eval).unwrap();
        let back: Evaluation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, eval);
    }
}
