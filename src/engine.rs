//! Engine facade: the public operations of the paideia core.
//!
//! The `Engine` owns a shared, immutable knowledge graph and a validated
//! policy, and exposes the five operations callers drive a learning session
//! with: suggest, update, progress, reset, and recent-attempt lookup. The
//! quiz bank and the learner profile stay caller-owned and are passed per
//! call, so one engine serves any number of learners concurrently reading
//! the same graph.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::concept::ConceptId;
use crate::error::{PaideiaResult, ScoreResult, SelectResult};
use crate::graph::KnowledgeGraph;
use crate::policy::Policy;
use crate::profile::{AttemptRecord, LearnerProfile};
use crate::progress::{self, LearningProgress};
use crate::quiz::Quiz;
use crate::score::ScoringSystem;
use crate::select::SelectionEngine;

/// The adaptive quiz engine.
pub struct Engine {
    graph: Arc<KnowledgeGraph>,
    policy: Policy,
}

impl Engine {
    /// Create an engine over a graph with the given policy.
    ///
    /// Validates the policy once; an invalid table is rejected here rather
    /// than surfacing mid-session.
    pub fn new(graph: Arc<KnowledgeGraph>, policy: Policy) -> PaideiaResult<Self> {
        policy.validate()?;
        tracing::info!(
            concepts = graph.concept_count(),
            edges = graph.edge_count(),
            fallback = %policy.fallback,
            "initializing quiz engine"
        );
        Ok(Self { graph, policy })
    }

    /// Create an engine with the default policy.
    pub fn with_defaults(graph: Arc<KnowledgeGraph>) -> Self {
        Self::new(graph, Policy::default()).expect("default policy is valid")
    }

    /// The engine's knowledge graph.
    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    /// The engine's policy table.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Decide the single best next quiz for the learner.
    pub fn suggest_next_quiz<'q>(
        &self,
        profile: &LearnerProfile,
        bank: &'q [Quiz],
        now: DateTime<Utc>,
    ) -> SelectResult<&'q Quiz> {
        SelectionEngine::new(&self.graph, &self.policy).suggest(profile, bank, now)
    }

    /// Apply an answered quiz, returning the successor profile.
    ///
    /// The input profile is logically superseded on success and untouched
    /// on failure.
    pub fn update_scores(
        &self,
        profile: &LearnerProfile,
        quiz: &Quiz,
        correct: bool,
        now: DateTime<Utc>,
    ) -> ScoreResult<LearnerProfile> {
        ScoringSystem::new(&self.graph, &self.policy).apply(profile, quiz, correct, now)
    }

    /// Summarize the learner's standing. Read-only.
    pub fn learning_progress(
        &self,
        profile: &LearnerProfile,
        now: DateTime<Utc>,
    ) -> LearningProgress {
        progress::learning_progress(profile, &self.graph, &self.policy, now)
    }

    /// Reset progress, entirely or for selected concepts.
    ///
    /// With `None` the successor is a fresh profile (learner id and creation
    /// time preserved, aggregates zeroed). With `Some(ids)` only those
    /// concepts leave the score and schedule maps; history and aggregates
    /// stay. `Some(&[])` therefore returns the profile unchanged.
    pub fn reset_progress(
        &self,
        profile: &LearnerProfile,
        concepts: Option<&[ConceptId]>,
    ) -> LearnerProfile {
        let mut next = profile.clone();
        match concepts {
            None => {
                tracing::info!(learner = %profile.learner_id, "resetting all progress");
                next.scores.clear();
                next.schedule.clear();
                next.attempts.clear();
                next.total_attempts = 0;
                next.total_correct = 0;
            }
            Some(ids) => {
                tracing::info!(
                    learner = %profile.learner_id,
                    concepts = ids.len(),
                    "resetting selected concepts"
                );
                for id in ids {
                    next.scores.remove(id);
                    next.schedule.remove(id);
                }
            }
        }
        next
    }

    /// Up to `k` most recent attempts, newest first, optionally restricted to
    /// one concept.
    pub fn recent_attempts<'p>(
        &self,
        profile: &'p LearnerProfile,
        concept: Option<&ConceptId>,
        k: usize,
    ) -> Vec<&'p AttemptRecord> {
        profile.recent_attempts(concept, k)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("graph", &*self.graph)
            .field("fallback", &self.policy.fallback)
            .finish()
    }
}
