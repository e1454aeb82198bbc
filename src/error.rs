//! Rich diagnostic error types for the paideia core.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and contextual data so callers know exactly
//! what went wrong and how to repair their inputs.

use miette::Diagnostic;
use thiserror::Error;

use crate::concept::ConceptId;

/// Top-level error type for the paideia core.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, contextual data) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum PaideiaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Select(#[from] SelectError),
}

// ---------------------------------------------------------------------------
// Policy errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PolicyError {
    #[error("score bounds are inverted: min {min} >= max {max}")]
    #[diagnostic(
        code(paideia::policy::inverted_bounds),
        help("score_min must be strictly below score_max; the defaults are -5.0 and +10.0.")
    )]
    InvertedScoreBounds { min: f64, max: f64 },

    #[error("threshold ordering violated: weak {weak} > mastery {mastery}")]
    #[diagnostic(
        code(paideia::policy::threshold_order),
        help(
            "weak_threshold must not exceed mastery_threshold. \
             Check the overridden values."
        )
    )]
    ThresholdOrder { weak: f64, mastery: f64 },

    #[error("mastery threshold {mastery} lies outside the score bounds [{min}, {max}]")]
    #[diagnostic(
        code(paideia::policy::mastery_out_of_bounds),
        help("A mastery threshold above score_max can never be reached; lower it.")
    )]
    MasteryOutOfBounds { mastery: f64, min: f64, max: f64 },

    #[error("review interval table is empty")]
    #[diagnostic(
        code(paideia::policy::empty_intervals),
        help(
            "review_intervals needs at least one entry; the default ladder is \
             [1, 3, 7, 14, 30, 60, 120] days."
        )
    )]
    EmptyIntervals,

    #[error("review interval at index {index} is {days} days (must be > 0)")]
    #[diagnostic(
        code(paideia::policy::nonpositive_interval),
        help("Every rung of the review ladder must be a positive number of days.")
    )]
    NonPositiveInterval { index: usize, days: i64 },

    #[error("history cap is zero")]
    #[diagnostic(
        code(paideia::policy::zero_history_cap),
        help("history_cap must be at least 1 so attempts can be recorded; the default is 15.")
    )]
    ZeroHistoryCap,

    #[error("lapse threshold {value} is outside [0, 1]")]
    #[diagnostic(
        code(paideia::policy::lapse_threshold_range),
        help("lapse_threshold is compared against rolling accuracy and must be a ratio in [0, 1].")
    )]
    LapseThresholdRange { value: f64 },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("prerequisite cycle detected: {}", format_cycle(cycle))]
    #[diagnostic(
        code(paideia::graph::cycle_detected),
        help(
            "Prerequisite edges must form a DAG. Remove one of the edges along the \
             reported cycle and rebuild the graph."
        )
    )]
    CycleDetected { cycle: Vec<ConceptId> },

    #[error("unknown concept: {concept_id}")]
    #[diagnostic(
        code(paideia::graph::unknown_concept),
        help(
            "The referenced concept is not a node of the knowledge graph. \
             Add the concept before referencing it, or fix the identifier."
        )
    )]
    UnknownConcept { concept_id: ConceptId },
}

fn format_cycle(cycle: &[ConceptId]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(|c| c.as_str()).collect();
    if let Some(first) = parts.first().copied() {
        parts.push(first);
    }
    parts.join(" -> ")
}

// ---------------------------------------------------------------------------
// Scoring errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ScoreError {
    #[error("quiz {quiz_id} links unknown concept {concept_id}")]
    #[diagnostic(
        code(paideia::score::unknown_concept),
        help(
            "An answered quiz referenced a concept the graph does not contain, \
             which means the quiz bank and the graph are out of sync. \
             The profile was left unchanged; repair the bank or the graph and retry."
        )
    )]
    UnknownConcept {
        quiz_id: String,
        concept_id: ConceptId,
    },

    #[error("stale profile: last updated {profile_updated_at}, writer clock {now}")]
    #[diagnostic(
        code(paideia::score::stale_profile),
        help(
            "The profile carries a later update timestamp than this writer's clock, \
             so another update was applied in the meantime. Reload the profile and retry."
        )
    )]
    StaleProfile {
        profile_updated_at: chrono::DateTime<chrono::Utc>,
        now: chrono::DateTime<chrono::Utc>,
    },
}

// ---------------------------------------------------------------------------
// Selection errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SelectError {
    #[error("no quiz available: {reason}")]
    #[diagnostic(
        code(paideia::select::no_quiz_available),
        help(
            "The engine exhausted the primary queue, the review pool, and the \
             configured fallback without finding a single presentable quiz. \
             Check that the bank is non-empty and that its items reference \
             concepts present in the graph."
        )
    )]
    NoQuizAvailable { reason: String },
}

/// Convenience alias for functions returning paideia results.
pub type PaideiaResult<T> = std::result::Result<T, PaideiaError>;

/// Result type for policy validation.
pub type PolicyResult<T> = std::result::Result<T, PolicyError>;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Result type for scoring operations.
pub type ScoreResult<T> = std::result::Result<T, ScoreError>;

/// Result type for selection operations.
pub type SelectResult<T> = std::result::Result<T, SelectError>;
