//! The scoring system: bounded score updates, prerequisite bonuses, and
//! schedule advancement.
//!
//! [`ScoringSystem::apply`] is a pure transformation
//! `(profile, quiz, correctness, now) -> profile'`: the input profile is never
//! touched, and on any validation failure no successor is produced at all.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::concept::ConceptId;
use crate::error::{ScoreError, ScoreResult};
use crate::graph::KnowledgeGraph;
use crate::policy::Policy;
use crate::profile::{AttemptRecord, LearnerProfile, ScheduleEntry};
use crate::quiz::Quiz;
use crate::schedule;

/// Applies attempt outcomes to learner profiles.
pub struct ScoringSystem<'a> {
    graph: &'a KnowledgeGraph,
    policy: &'a Policy,
}

impl<'a> ScoringSystem<'a> {
    /// Create a scoring system over a graph and policy.
    pub fn new(graph: &'a KnowledgeGraph, policy: &'a Policy) -> Self {
        Self { graph, policy }
    }

    /// Apply one answered quiz to a profile, returning the successor profile.
    ///
    /// Fails with [`ScoreError::UnknownConcept`] if the quiz links a concept
    /// the graph does not contain, and with [`ScoreError::StaleProfile`] if
    /// the profile was updated after this writer's clock. Either way the
    /// input profile is unchanged.
    pub fn apply(
        &self,
        profile: &LearnerProfile,
        quiz: &Quiz,
        correct: bool,
        now: DateTime<Utc>,
    ) -> ScoreResult<LearnerProfile> {
        if profile.last_updated > now {
            return Err(ScoreError::StaleProfile {
                profile_updated_at: profile.last_updated,
                now,
            });
        }

        let linked: BTreeSet<&ConceptId> = quiz.linked_concepts.iter().collect();
        for concept in &linked {
            if !self.graph.contains(concept) {
                return Err(ScoreError::UnknownConcept {
                    quiz_id: quiz.id.as_str().to_owned(),
                    concept_id: (*concept).clone(),
                });
            }
        }

        let mut next = profile.clone();
        let delta = if correct {
            self.policy.correct_delta
        } else {
            self.policy.incorrect_delta
        };

        for concept in &linked {
            let old = next.score(concept);
            let new = self.policy.clamp_score(old + delta);
            tracing::debug!(concept = %concept, old, new, correct, "score delta");
            next.scores.insert((*concept).clone(), new);
        }

        if correct {
            // One bonus per unique direct prerequisite, excluding the linked
            // concepts themselves, regardless of how many linked concepts
            // share the prerequisite.
            let mut bonus_targets: BTreeSet<ConceptId> = BTreeSet::new();
            for concept in &linked {
                let prereqs = self
                    .graph
                    .direct_prerequisites(concept)
                    .expect("linked concepts validated above");
                bonus_targets.extend(prereqs);
            }
            for concept in &linked {
                bonus_targets.remove(*concept);
            }
            for prereq in bonus_targets {
                let old = next.score(&prereq);
                let new = self.policy.clamp_score(old + self.policy.prereq_bonus);
                tracing::debug!(prerequisite = %prereq, old, new, "prerequisite bonus");
                next.scores.insert(prereq, new);
            }
        }

        for concept in &linked {
            self.update_schedule(profile, &mut next, concept, correct, now);
        }

        next.push_attempt(
            AttemptRecord {
                quiz_id: quiz.id.clone(),
                concepts: quiz.linked_concepts.clone(),
                correct,
                at: now,
                difficulty: quiz.difficulty,
            },
            self.policy.history_cap,
        );
        next.last_updated = now;
        Ok(next)
    }

    fn update_schedule(
        &self,
        before: &LearnerProfile,
        next: &mut LearnerProfile,
        concept: &ConceptId,
        correct: bool,
        now: DateTime<Utc>,
    ) {
        let mut entry = next.schedule.get(concept).cloned().unwrap_or(ScheduleEntry {
            last_seen_at: now,
            next_due_at: now,
            interval_index: 0,
            success_streak: 0,
            lapses: 0,
            rolling_accuracy: 0.0,
        });

        // Observation count for the smoothing blend: prior attempts linked to
        // this concept inside the recent window, plus the current one. Below
        // saturation this is a plain cumulative mean; at saturation it becomes
        // an exponential blend with weight 1/recent_window.
        let prior = before
            .recent_attempts(Some(concept), self.policy.recent_window)
            .len();
        let n = (prior + 1).min(self.policy.recent_window).max(1);
        let sample = if correct { 1.0 } else { 0.0 };
        entry.rolling_accuracy =
            (entry.rolling_accuracy * (n - 1) as f64 + sample) / n as f64;

        if correct {
            entry.success_streak += 1;
        } else {
            entry.lapses += 1;
            entry.success_streak = 0;
        }
        entry.interval_index = schedule::advance_interval(
            entry.interval_index,
            correct,
            entry.rolling_accuracy,
            self.policy,
        );
        entry.last_seen_at = now;
        entry.next_due_at = schedule::next_due_at(now, entry.interval_index, self.policy);

        tracing::debug!(
            concept = %concept,
            interval_index = entry.interval_index,
            streak = entry.success_streak,
            lapses = entry.lapses,
            rolling_accuracy = entry.rolling_accuracy,
            next_due_at = %entry.next_due_at,
            "schedule transition"
        );
        next.schedule.insert(concept.clone(), entry);
    }
}
