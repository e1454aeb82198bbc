//! The policy table: named constants and tunables for selection and scoring.
//!
//! A [`Policy`] is a frozen value passed to the engine at construction. The
//! defaults reproduce the reference behavior; any field can be overridden, and
//! [`Policy::validate`] rejects combinations that would break the engine's
//! invariants (surfaced as the `InvalidPolicy` error kind).

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// What to do when no quiz matches the primary criteria.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Re-target the mastered concept with the earliest due review at band 1-2.
    #[default]
    Easiest,
    /// Pick a concept uniformly among those with at least one quiz.
    Random,
    /// Fail with `NoQuizAvailable`.
    Raise,
}

impl std::fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackStrategy::Easiest => write!(f, "easiest"),
            FallbackStrategy::Random => write!(f, "random"),
            FallbackStrategy::Raise => write!(f, "raise"),
        }
    }
}

/// Tunables consumed by the scoring system and the selection engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Lower clamp bound for mastery scores.
    pub score_min: f64,
    /// Upper clamp bound for mastery scores.
    pub score_max: f64,
    /// At or above this score a concept counts as mastered.
    pub mastery_threshold: f64,
    /// At or below this score a concept counts as weak.
    pub weak_threshold: f64,
    /// Delta applied to every linked concept on a correct answer.
    pub correct_delta: f64,
    /// Delta applied to every linked concept on an incorrect answer.
    pub incorrect_delta: f64,
    /// Bonus applied once per unique direct prerequisite on a correct answer.
    pub prereq_bonus: f64,
    /// Spaced-repetition ladder in days, indexed by `interval_index`.
    pub review_intervals: Vec<i64>,
    /// If rolling accuracy drops below this on a correct answer, the interval
    /// index regresses one rung.
    pub lapse_threshold: f64,
    /// Attempts inspected for difficulty adaptation and variety.
    pub recent_window: usize,
    /// Maximum retained attempt records.
    pub history_cap: usize,
    /// Cap on overdue reviews surfaced in one suggestion call.
    pub max_due_reviews_per_suggestion: usize,
    /// Behavior when no quiz matches the primary criteria.
    pub fallback: FallbackStrategy,
    /// Seed for reproducible tie-breaking. `None` keeps tie-breaking purely
    /// identifier-ordered.
    pub rng_seed: Option<u64>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            score_min: -5.0,
            score_max: 10.0,
            mastery_threshold: 3.0,
            weak_threshold: 0.0,
            correct_delta: 1.0,
            incorrect_delta: -1.0,
            prereq_bonus: 0.1,
            review_intervals: vec![1, 3, 7, 14, 30, 60, 120],
            lapse_threshold: 0.5,
            recent_window: 10,
            history_cap: 15,
            max_due_reviews_per_suggestion: 1,
            fallback: FallbackStrategy::Easiest,
            rng_seed: None,
        }
    }
}

impl Policy {
    /// Check the table for orderings that would break engine invariants.
    ///
    /// Called once at engine construction; a frozen valid policy stays valid.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.score_min >= self.score_max {
            return Err(PolicyError::InvertedScoreBounds {
                min: self.score_min,
                max: self.score_max,
            });
        }
        if self.weak_threshold > self.mastery_threshold {
            return Err(PolicyError::ThresholdOrder {
                weak: self.weak_threshold,
                mastery: self.mastery_threshold,
            });
        }
        if self.mastery_threshold > self.score_max || self.mastery_threshold < self.score_min {
            return Err(PolicyError::MasteryOutOfBounds {
                mastery: self.mastery_threshold,
                min: self.score_min,
                max: self.score_max,
            });
        }
        if self.review_intervals.is_empty() {
            return Err(PolicyError::EmptyIntervals);
        }
        for (index, &days) in self.review_intervals.iter().enumerate() {
            if days <= 0 {
                return Err(PolicyError::NonPositiveInterval { index, days });
            }
        }
        if self.history_cap == 0 {
            return Err(PolicyError::ZeroHistoryCap);
        }
        if !(0.0..=1.0).contains(&self.lapse_threshold) {
            return Err(PolicyError::LapseThresholdRange {
                value: self.lapse_threshold,
            });
        }
        Ok(())
    }

    /// Clamp a raw score into `[score_min, score_max]`.
    pub fn clamp_score(&self, value: f64) -> f64 {
        value.clamp(self.score_min, self.score_max)
    }

    /// Whether a score counts as mastered.
    pub fn is_mastered(&self, score: f64) -> bool {
        score >= self.mastery_threshold
    }

    /// Whether a score counts as weak.
    pub fn is_weak(&self, score: f64) -> bool {
        score <= self.weak_threshold
    }

    /// Index of the highest rung of the review ladder.
    pub fn max_interval_index(&self) -> usize {
        self.review_intervals.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        Policy::default().validate().unwrap();
    }

    #[test]
    fn default_values_match_reference() {
        let p = Policy::default();
        assert_eq!(p.score_min, -5.0);
        assert_eq!(p.score_max, 10.0);
        assert_eq!(p.mastery_threshold, 3.0);
        assert_eq!(p.weak_threshold, 0.0);
        assert_eq!(p.review_intervals, vec![1, 3, 7, 14, 30, 60, 120]);
        assert_eq!(p.recent_window, 10);
        assert_eq!(p.history_cap, 15);
        assert_eq!(p.max_due_reviews_per_suggestion, 1);
        assert_eq!(p.fallback, FallbackStrategy::Easiest);
        assert!(p.rng_seed.is_none());
    }

    #[test]
    fn inverted_bounds_rejected() {
        let p = Policy {
            score_min: 10.0,
            score_max: -5.0,
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(PolicyError::InvertedScoreBounds { .. })
        ));
    }

    #[test]
    fn weak_above_mastery_rejected() {
        let p = Policy {
            weak_threshold: 4.0,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(PolicyError::ThresholdOrder { .. })));
    }

    #[test]
    fn empty_interval_table_rejected() {
        let p = Policy {
            review_intervals: vec![],
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(PolicyError::EmptyIntervals)));
    }

    #[test]
    fn nonpositive_interval_rejected() {
        let p = Policy {
            review_intervals: vec![1, 0, 7],
            ..Default::default()
        };
        assert!(matches!(
            p.validate(),
            Err(PolicyError::NonPositiveInterval { index: 1, days: 0 })
        ));
    }

    #[test]
    fn zero_history_cap_rejected() {
        let p = Policy {
            history_cap: 0,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(PolicyError::ZeroHistoryCap)));
    }

    #[test]
    fn clamp_score_respects_bounds() {
        let p = Policy::default();
        assert_eq!(p.clamp_score(42.0), 10.0);
        assert_eq!(p.clamp_score(-42.0), -5.0);
        assert_eq!(p.clamp_score(1.5), 1.5);
    }

    #[test]
    fn fallback_strategy_serde_round_trip() {
        let json = serde_json::to_string(&FallbackStrategy::Raise).unwrap();
        assert_eq!(json, "\"raise\"");
        let back: FallbackStrategy = serde_json::from_str("\"easiest\"").unwrap();
        assert_eq!(back, FallbackStrategy::Easiest);
    }
}
