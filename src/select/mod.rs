//! The selection engine: weakness-first targeting, prerequisite gating,
//! difficulty adaptation, review scheduling, and deterministic fallbacks.
//!
//! [`SelectionEngine::suggest`] runs a fixed pipeline: filter the bank,
//! order candidate concepts weakest-first, walk the prerequisite gate, choose
//! an item per target, then fall through the review pool and the configured
//! fallback strategy. For fixed inputs and policy the result is always the
//! same item; any randomness comes only from an explicitly configured seed.

pub mod band;
pub mod candidates;
pub mod choose;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};

use crate::concept::ConceptId;
use crate::error::{SelectError, SelectResult};
use crate::graph::{self, KnowledgeGraph};
use crate::policy::{FallbackStrategy, Policy};
use crate::profile::LearnerProfile;
use crate::quiz::Quiz;
use crate::schedule;

pub use band::{band_for, band_from_accuracy, band_from_score, DifficultyBand, NEUTRAL_ACCURACY};
pub use candidates::{concept_pools, filter_bank, gating_walk, unmet_prerequisites, ConceptPools};
pub use choose::ItemChooser;

/// Chooses the next quiz for a learner.
pub struct SelectionEngine<'a> {
    graph: &'a KnowledgeGraph,
    policy: &'a Policy,
}

impl<'a> SelectionEngine<'a> {
    /// Create a selection engine over a graph and policy.
    pub fn new(graph: &'a KnowledgeGraph, policy: &'a Policy) -> Self {
        Self { graph, policy }
    }

    /// The difficulty band for a target given the learner's current state.
    fn target_band(&self, profile: &LearnerProfile, target: &ConceptId) -> DifficultyBand {
        let accuracy = profile
            .recent_accuracy(Some(target), self.policy.recent_window)
            .unwrap_or(NEUTRAL_ACCURACY);
        band_for(profile.score(target), accuracy)
    }

    /// Suggest the single best next quiz out of `bank`.
    ///
    /// Fails with [`SelectError::NoQuizAvailable`] only when every stage of
    /// the pipeline comes up empty and the policy does not permit a fallback
    /// to succeed.
    pub fn suggest<'q>(
        &self,
        profile: &LearnerProfile,
        bank: &'q [Quiz],
        now: DateTime<Utc>,
    ) -> SelectResult<&'q Quiz> {
        let valid = filter_bank(self.graph, bank);
        let pools = concept_pools(&valid, profile, self.policy);
        let chooser = ItemChooser::new(self.policy, profile, &valid, &pools.weak);

        // Primary queue, gated by prerequisites.
        for target in gating_walk(self.graph, profile, &pools.primary_queue) {
            let band = self.target_band(profile, &target);
            if let Some((quiz, used)) = chooser.choose(&target, band) {
                tracing::info!(
                    quiz_id = %quiz.id,
                    target = %target,
                    band = %used,
                    stage = "primary",
                    "suggestion chosen"
                );
                return Ok(quiz);
            }
        }

        // Review pool: in-progress concepts whose review has fallen due.
        for target in self.due_reviews(profile, now) {
            let band = self.target_band(profile, &target);
            if let Some((quiz, used)) = chooser.choose(&target, band) {
                tracing::info!(
                    quiz_id = %quiz.id,
                    target = %target,
                    band = %used,
                    stage = "review",
                    "suggestion chosen"
                );
                return Ok(quiz);
            }
        }

        tracing::warn!(
            strategy = %self.policy.fallback,
            "no primary or review target produced a quiz; applying fallback"
        );
        let fallback = match self.policy.fallback {
            FallbackStrategy::Raise => {
                return Err(SelectError::NoQuizAvailable {
                    reason: "primary queue and review pool are exhausted and the policy forbids fallbacks".into(),
                });
            }
            FallbackStrategy::Easiest => self.fallback_easiest(profile, &chooser),
            FallbackStrategy::Random => self.fallback_random(profile, &pools, &chooser),
        };
        if let Some((quiz, target, used)) = fallback {
            tracing::info!(
                quiz_id = %quiz.id,
                target = %target,
                band = %used,
                stage = "fallback",
                "suggestion chosen"
            );
            return Ok(quiz);
        }

        // Terminal fallback: the topologically earliest unmastered concept
        // that still has a quiz.
        for target in graph::topological_order(self.graph) {
            if self.policy.is_mastered(profile.score(&target))
                || !pools.universe.contains(&target)
            {
                continue;
            }
            let band = self.target_band(profile, &target);
            if let Some((quiz, used)) = chooser.choose(&target, band) {
                tracing::info!(
                    quiz_id = %quiz.id,
                    target = %target,
                    band = %used,
                    stage = "topological",
                    "suggestion chosen"
                );
                return Ok(quiz);
            }
        }

        Err(SelectError::NoQuizAvailable {
            reason: "no concept with a presentable quiz remains".into(),
        })
    }

    /// Due in-progress concepts, ordered `(next_due_at, score, id)` ascending,
    /// capped by policy.
    fn due_reviews(&self, profile: &LearnerProfile, now: DateTime<Utc>) -> Vec<ConceptId> {
        let mut due: Vec<(DateTime<Utc>, f64, ConceptId)> = profile
            .schedule
            .iter()
            .filter(|(concept, entry)| {
                let score = profile.score(concept);
                score >= 0.0
                    && !self.policy.is_mastered(score)
                    && schedule::is_due(entry.next_due_at, now)
            })
            .map(|(concept, entry)| (entry.next_due_at, profile.score(concept), concept.clone()))
            .collect();
        due.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.total_cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });
        due.into_iter()
            .take(self.policy.max_due_reviews_per_suggestion)
            .map(|(_, _, concept)| concept)
            .collect()
    }

    /// "easiest": re-target the mastered concept with the earliest due review
    /// (any mastered concept when none is scheduled) at band 1-2.
    fn fallback_easiest<'q>(
        &self,
        profile: &LearnerProfile,
        chooser: &ItemChooser<'_, 'q>,
    ) -> Option<(&'q Quiz, ConceptId, DifficultyBand)> {
        let mut mastered: Vec<(Option<DateTime<Utc>>, ConceptId)> = profile
            .scores
            .iter()
            .filter(|(concept, &score)| {
                self.policy.is_mastered(score) && self.graph.contains(concept)
            })
            .map(|(concept, _)| {
                let due = profile.schedule.get(concept).map(|e| e.next_due_at);
                (due, concept.clone())
            })
            .collect();
        // Scheduled concepts first by due date, then unscheduled, ties by id.
        mastered.sort_by(|a, b| match (&a.0, &b.0) {
            (Some(x), Some(y)) => x.cmp(y).then_with(|| a.1.cmp(&b.1)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });

        let (_, target) = mastered.into_iter().next()?;
        let band = DifficultyBand::new(1, 2);
        chooser
            .choose(&target, band)
            .map(|(quiz, used)| (quiz, target, used))
    }

    /// "random": sample a concept with at least one quiz; without a configured
    /// seed the draw degrades to the lowest id so selection stays
    /// deterministic.
    fn fallback_random<'q>(
        &self,
        profile: &LearnerProfile,
        pools: &ConceptPools,
        chooser: &ItemChooser<'_, 'q>,
    ) -> Option<(&'q Quiz, ConceptId, DifficultyBand)> {
        let universe: Vec<&ConceptId> = pools.universe.iter().collect();
        if universe.is_empty() {
            return None;
        }
        let target = match self.policy.rng_seed {
            Some(seed) => {
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
                universe[rng.gen_range(0..universe.len())].clone()
            }
            None => universe[0].clone(),
        };
        let band = self.target_band(profile, &target);
        chooser
            .choose(&target, band)
            .map(|(quiz, used)| (quiz, target, used))
    }
}
