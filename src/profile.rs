//! Per-learner mutable state: mastery scores, review schedule, attempt history.
//!
//! A [`LearnerProfile`] is authoritatively owned by the caller and mutated only
//! through the scoring and reset operations, which return successor values.
//! Maps are `BTreeMap`s so iteration order (and therefore every downstream
//! tie-break) is deterministic, and every field round-trips through serde for
//! whatever storage the caller provides.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::concept::ConceptId;
use crate::quiz::{Difficulty, QuizId};

/// One recorded quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// The quiz that was answered.
    pub quiz_id: QuizId,
    /// The concepts the quiz exercised at the time.
    pub concepts: Vec<ConceptId>,
    /// Whether the answer was correct.
    pub correct: bool,
    /// When the answer was submitted.
    pub at: DateTime<Utc>,
    /// The quiz's difficulty at the time.
    pub difficulty: Difficulty,
}

/// Spaced-repetition schedule state for one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// When the concept was last exercised.
    pub last_seen_at: DateTime<Utc>,
    /// When the next review falls due.
    pub next_due_at: DateTime<Utc>,
    /// Index into the review-interval ladder.
    pub interval_index: usize,
    /// Consecutive correct answers.
    pub success_streak: u32,
    /// Times the concept lapsed (incorrect after prior progress).
    pub lapses: u32,
    /// Smoothed recent accuracy in [0, 1].
    pub rolling_accuracy: f64,
}

/// Per-learner profile: scores, schedule, bounded history, aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfile {
    /// Opaque learner identifier.
    pub learner_id: String,
    /// Mastery score per concept. A missing key means 0.0.
    pub scores: BTreeMap<ConceptId, f64>,
    /// Review schedule per concept.
    pub schedule: BTreeMap<ConceptId, ScheduleEntry>,
    /// Most recent attempts, oldest first, FIFO-capped by policy.
    pub attempts: VecDeque<AttemptRecord>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last mutated.
    pub last_updated: DateTime<Utc>,
    /// Lifetime attempt count. Never decreases.
    pub total_attempts: u64,
    /// Lifetime correct count. Never decreases, never exceeds `total_attempts`.
    pub total_correct: u64,
}

impl LearnerProfile {
    /// Create an empty profile for a learner.
    pub fn new(learner_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            learner_id: learner_id.into(),
            scores: BTreeMap::new(),
            schedule: BTreeMap::new(),
            attempts: VecDeque::new(),
            created_at: now,
            last_updated: now,
            total_attempts: 0,
            total_correct: 0,
        }
    }

    /// Effective score for a concept: the stored value, or 0.0 if never seen.
    pub fn score(&self, concept: &ConceptId) -> f64 {
        self.scores.get(concept).copied().unwrap_or(0.0)
    }

    /// Append an attempt, discarding the oldest once `cap` is exceeded.
    pub fn push_attempt(&mut self, record: AttemptRecord, cap: usize) {
        self.attempts.push_back(record);
        while self.attempts.len() > cap {
            self.attempts.pop_front();
        }
        self.total_attempts += 1;
        if self.attempts.back().map(|a| a.correct).unwrap_or(false) {
            self.total_correct += 1;
        }
    }

    /// Up to `k` most recent attempts, newest first, optionally restricted to
    /// attempts that exercised `concept`.
    pub fn recent_attempts(&self, concept: Option<&ConceptId>, k: usize) -> Vec<&AttemptRecord> {
        self.attempts
            .iter()
            .rev()
            .filter(|a| match concept {
                Some(c) => a.concepts.contains(c),
                None => true,
            })
            .take(k)
            .collect()
    }

    /// Accuracy over the `window` most recent attempts (optionally restricted
    /// to one concept). `None` when no attempt matches.
    pub fn recent_accuracy(&self, concept: Option<&ConceptId>, window: usize) -> Option<f64> {
        let recent = self.recent_attempts(concept, window);
        if recent.is_empty() {
            return None;
        }
        let correct = recent.iter().filter(|a| a.correct).count();
        Some(correct as f64 / recent.len() as f64)
    }

    /// Lifetime accuracy, or 0.0 before the first attempt.
    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.total_correct as f64 / self.total_attempts as f64
        }
    }

    /// Serialize to pretty JSON for the caller's storage collaborator.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON produced by [`Self::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn attempt(quiz: &str, concepts: &[&str], correct: bool) -> AttemptRecord {
        AttemptRecord {
            quiz_id: QuizId::new(quiz),
            concepts: concepts.iter().map(|c| ConceptId::new(*c)).collect(),
            correct,
            at: t0(),
            difficulty: Difficulty::new(3).unwrap(),
        }
    }

    #[test]
    fn fresh_profile_is_empty() {
        let p = LearnerProfile::new("learner-1", t0());
        assert!(p.scores.is_empty());
        assert!(p.schedule.is_empty());
        assert!(p.attempts.is_empty());
        assert_eq!(p.total_attempts, 0);
        assert_eq!(p.total_correct, 0);
        assert_eq!(p.accuracy(), 0.0);
    }

    #[test]
    fn missing_score_defaults_to_zero() {
        let p = LearnerProfile::new("learner-1", t0());
        assert_eq!(p.score(&ConceptId::new("loops")), 0.0);
    }

    #[test]
    fn history_is_fifo_capped() {
        let mut p = LearnerProfile::new("learner-1", t0());
        for i in 0..20 {
            p.push_attempt(attempt(&format!("q{i}"), &["a"], true), 15);
        }
        assert_eq!(p.attempts.len(), 15);
        // Oldest five were discarded.
        assert_eq!(p.attempts.front().unwrap().quiz_id, QuizId::new("q5"));
        assert_eq!(p.attempts.back().unwrap().quiz_id, QuizId::new("q19"));
        // Aggregates keep counting past the cap.
        assert_eq!(p.total_attempts, 20);
        assert_eq!(p.total_correct, 20);
    }

    #[test]
    fn recent_attempts_filters_by_concept_newest_first() {
        let mut p = LearnerProfile::new("learner-1", t0());
        p.push_attempt(attempt("q1", &["a"], true), 15);
        p.push_attempt(attempt("q2", &["b"], false), 15);
        p.push_attempt(attempt("q3", &["a", "b"], true), 15);

        let for_a = p.recent_attempts(Some(&ConceptId::new("a")), 10);
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].quiz_id, QuizId::new("q3"));
        assert_eq!(for_a[1].quiz_id, QuizId::new("q1"));

        let capped = p.recent_attempts(None, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].quiz_id, QuizId::new("q3"));
    }

    #[test]
    fn recent_accuracy_windows() {
        let mut p = LearnerProfile::new("learner-1", t0());
        assert!(p.recent_accuracy(None, 10).is_none());

        p.push_attempt(attempt("q1", &["a"], true), 15);
        p.push_attempt(attempt("q2", &["a"], false), 15);
        assert_eq!(p.recent_accuracy(Some(&ConceptId::new("a")), 10), Some(0.5));
        // Window of one sees only the newest (incorrect) attempt.
        assert_eq!(p.recent_accuracy(Some(&ConceptId::new("a")), 1), Some(0.0));
    }

    #[test]
    fn aggregate_counters_track_correctness() {
        let mut p = LearnerProfile::new("learner-1", t0());
        p.push_attempt(attempt("q1", &["a"], true), 15);
        p.push_attempt(attempt("q2", &["a"], false), 15);
        p.push_attempt(attempt("q3", &["a"], true), 15);
        assert_eq!(p.total_attempts, 3);
        assert_eq!(p.total_correct, 2);
        assert!((p.accuracy() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn json_round_trip_preserves_everything() {
        let mut p = LearnerProfile::new("learner-1", t0());
        p.scores.insert(ConceptId::new("a"), 2.5);
        p.schedule.insert(
            ConceptId::new("a"),
            ScheduleEntry {
                last_seen_at: t0(),
                next_due_at: t0() + chrono::Duration::days(3),
                interval_index: 1,
                success_streak: 2,
                lapses: 1,
                rolling_accuracy: 0.75,
            },
        );
        p.push_attempt(attempt("q1", &["a"], true), 15);

        let json = p.to_json().unwrap();
        let back = LearnerProfile::from_json(&json).unwrap();
        assert_eq!(back, p);
    }
}
