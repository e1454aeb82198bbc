//! The learning-progress report: a read-only summary of one profile
//! against the knowledge graph.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::concept::ConceptId;
use crate::graph::KnowledgeGraph;
use crate::policy::Policy;
use crate::profile::LearnerProfile;
use crate::schedule;
use crate::select::{band_for, DifficultyBand, NEUTRAL_ACCURACY};

/// Snapshot of a learner's standing. Computing it never mutates the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningProgress {
    /// Concepts at or above the mastery threshold, by id.
    pub mastered: Vec<ConceptId>,
    /// Concepts strictly between neutral and mastery, by id.
    pub in_progress: Vec<ConceptId>,
    /// Concepts at or below the weak threshold, weakest first.
    pub weak: Vec<ConceptId>,
    /// Graph concepts holding a nonzero score, as a percentage of the graph.
    pub coverage_pct: f64,
    /// Lifetime attempts.
    pub total_attempts: u64,
    /// Lifetime correct answers.
    pub total_correct: u64,
    /// Lifetime accuracy, 0.0 before the first attempt.
    pub accuracy: f64,
    /// Schedule entries due at the report's clock reading.
    pub due_reviews: usize,
    /// Due reviews grouped by the difficulty band each would be served at.
    pub overdue_by_band: BTreeMap<DifficultyBand, usize>,
}

/// Compute the progress report for a profile.
pub fn learning_progress(
    profile: &LearnerProfile,
    graph: &KnowledgeGraph,
    policy: &Policy,
    now: DateTime<Utc>,
) -> LearningProgress {
    let mut mastered = Vec::new();
    let mut in_progress = Vec::new();
    let mut weak: Vec<(f64, ConceptId)> = Vec::new();

    for (concept, &score) in &profile.scores {
        if policy.is_mastered(score) {
            mastered.push(concept.clone());
        } else if policy.is_weak(score) {
            weak.push((score, concept.clone()));
        } else {
            in_progress.push(concept.clone());
        }
    }
    weak.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let covered = profile
        .scores
        .iter()
        .filter(|(concept, &score)| score != 0.0 && graph.contains(concept))
        .count();
    let coverage_pct = if graph.concept_count() == 0 {
        0.0
    } else {
        covered as f64 / graph.concept_count() as f64 * 100.0
    };

    let mut due_reviews = 0;
    let mut overdue_by_band: BTreeMap<DifficultyBand, usize> = BTreeMap::new();
    for (concept, entry) in &profile.schedule {
        if schedule::is_due(entry.next_due_at, now) {
            due_reviews += 1;
            let accuracy = profile
                .recent_accuracy(Some(concept), policy.recent_window)
                .unwrap_or(NEUTRAL_ACCURACY);
            let band = band_for(profile.score(concept), accuracy);
            *overdue_by_band.entry(band).or_insert(0) += 1;
        }
    }

    LearningProgress {
        mastered,
        in_progress,
        weak: weak.into_iter().map(|(_, concept)| concept).collect(),
        coverage_pct,
        total_attempts: profile.total_attempts,
        total_correct: profile.total_correct,
        accuracy: profile.accuracy(),
        due_reviews,
        overdue_by_band,
    }
}
