//! # paideia
//!
//! An adaptive quiz selection and scoring core. Given a per-learner profile of
//! mastery scores, a DAG of concept prerequisites, and a bank of quiz items,
//! the engine decides the single best next quiz and, once answered, folds the
//! result back into the learner's scores and review schedule.
//!
//! ## Architecture
//!
//! - **Knowledge graph** (`graph`): petgraph-backed prerequisite DAG with
//!   cycle rejection at construction and memoized closure queries
//! - **Scoring** (`score`): bounded score deltas, prerequisite bonuses, and
//!   spaced-repetition schedule advancement as a pure profile transformation
//! - **Selection** (`select`): weakness-first targeting, prerequisite gating,
//!   difficulty-band adaptation, review pool, and deterministic fallbacks
//! - **Policy** (`policy`): a frozen, validated table of thresholds and
//!   tunables injected at engine construction
//! - **Facade** (`engine`): the five public operations over caller-owned
//!   profiles and banks
//!
//! The core is single-threaded and synchronous: every operation takes the
//! clock as an explicit parameter and completes before returning. The graph
//! and quiz bank are immutable shared inputs; the profile is caller-owned and
//! superseded by the values the mutating operations return.
//!
//! ## Library usage
//!
//! ```
//! use std::sync::Arc;
//! use chrono::{TimeZone, Utc};
//! use paideia::{Concept, ConceptId, Difficulty, Engine, KnowledgeGraph, LearnerProfile, Quiz};
//!
//! let graph = KnowledgeGraph::build(
//!     [Concept::new("basics", "Basics"), Concept::new("loops", "Loops")],
//!     [(ConceptId::new("basics"), ConceptId::new("loops"))],
//! )
//! .unwrap();
//! let engine = Engine::with_defaults(Arc::new(graph));
//!
//! let bank = vec![
//!     Quiz::new("q1", vec![ConceptId::new("basics")], Difficulty::new(2).unwrap(), "multiple_choice"),
//!     Quiz::new("q2", vec![ConceptId::new("loops")], Difficulty::new(3).unwrap(), "fill_in_blank"),
//! ];
//! let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! let profile = LearnerProfile::new("learner-1", now);
//!
//! let quiz = engine.suggest_next_quiz(&profile, &bank, now).unwrap();
//! let profile = engine.update_scores(&profile, quiz, true, now).unwrap();
//! assert_eq!(profile.total_attempts, 1);
//! ```

pub mod concept;
pub mod engine;
pub mod error;
pub mod graph;
pub mod policy;
pub mod profile;
pub mod progress;
pub mod quiz;
pub mod schedule;
pub mod score;
pub mod select;

// Re-exports for convenience
pub use concept::{Concept, ConceptId};
pub use engine::Engine;
pub use error::{
    GraphError, PaideiaError, PaideiaResult, PolicyError, ScoreError, SelectError,
};
pub use graph::{learning_path, topological_order, KnowledgeGraph};
pub use policy::{FallbackStrategy, Policy};
pub use profile::{AttemptRecord, LearnerProfile, ScheduleEntry};
pub use progress::LearningProgress;
pub use quiz::{Difficulty, Quiz, QuizContent, QuizId};
pub use select::DifficultyBand;
