//! Spaced-repetition ladder arithmetic.
//!
//! Pure functions over `(interval index, correctness, rolling accuracy, clock)`.
//! A correct answer climbs one rung of the policy's interval ladder, an
//! incorrect answer resets to the bottom, and a correct answer with poor
//! rolling accuracy slips back one rung.

use chrono::{DateTime, Duration, Utc};

use crate::policy::Policy;

/// Next interval index after an attempt.
///
/// - incorrect: reset to 0
/// - correct: advance one rung, capped at the ladder top
/// - correct but `rolling_accuracy` below the lapse threshold: after the
///   advance, slip back one rung (never below 0)
pub fn advance_interval(
    current: usize,
    correct: bool,
    rolling_accuracy: f64,
    policy: &Policy,
) -> usize {
    if !correct {
        return 0;
    }
    let advanced = (current + 1).min(policy.max_interval_index());
    if rolling_accuracy < policy.lapse_threshold && advanced > 0 {
        advanced - 1
    } else {
        advanced
    }
}

/// Due date for a given rung: `now` plus the rung's day count.
pub fn next_due_at(now: DateTime<Utc>, interval_index: usize, policy: &Policy) -> DateTime<Utc> {
    let index = interval_index.min(policy.max_interval_index());
    now + Duration::days(policy.review_intervals[index])
}

/// Whether a review has fallen due.
pub fn is_due(next_due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    next_due <= now
}

/// Whole days until a review falls due. Negative when overdue.
pub fn days_until(next_due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (next_due - now).num_days()
}

/// Days of review remaining to climb from `interval_index` to the ladder top,
/// assuming every review succeeds.
pub fn estimate_days_to_ladder_top(interval_index: usize, policy: &Policy) -> i64 {
    let top = policy.max_interval_index();
    if interval_index >= top {
        return 0;
    }
    policy.review_intervals[interval_index..=top].iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn correct_advances_one_rung() {
        let p = Policy::default();
        assert_eq!(advance_interval(0, true, 1.0, &p), 1);
        assert_eq!(advance_interval(3, true, 1.0, &p), 4);
    }

    #[test]
    fn ladder_top_is_sticky() {
        let p = Policy::default();
        let top = p.max_interval_index();
        assert_eq!(advance_interval(top, true, 1.0, &p), top);
    }

    #[test]
    fn incorrect_resets_to_bottom() {
        let p = Policy::default();
        assert_eq!(advance_interval(5, false, 1.0, &p), 0);
        assert_eq!(advance_interval(0, false, 0.0, &p), 0);
    }

    #[test]
    fn low_accuracy_slips_one_rung() {
        let p = Policy::default();
        // Advance 3 -> 4, then slip back to 3.
        assert_eq!(advance_interval(3, true, 0.4, &p), 3);
        // From the bottom the advance still lands on 1 - 1 = 0.
        assert_eq!(advance_interval(0, true, 0.4, &p), 0);
    }

    #[test]
    fn first_correct_answer_lands_on_three_days() {
        let p = Policy::default();
        let index = advance_interval(0, true, 1.0, &p);
        assert_eq!(index, 1);
        assert_eq!(next_due_at(t0(), index, &p), t0() + Duration::days(3));
    }

    #[test]
    fn lapse_lands_on_one_day() {
        let p = Policy::default();
        let index = advance_interval(4, false, 0.9, &p);
        assert_eq!(index, 0);
        assert_eq!(next_due_at(t0(), index, &p), t0() + Duration::days(1));
    }

    #[test]
    fn due_at_and_after_the_deadline() {
        let due = t0() + Duration::days(3);
        assert!(!is_due(due, t0()));
        assert!(is_due(due, due));
        assert!(is_due(due, due + Duration::hours(1)));
    }

    #[test]
    fn days_until_counts_signed_days() {
        let due = t0() + Duration::days(7);
        assert_eq!(days_until(due, t0()), 7);
        assert_eq!(days_until(due, due + Duration::days(2)), -2);
    }

    #[test]
    fn estimate_sums_remaining_rungs() {
        let p = Policy::default();
        // From the top there is nothing left to climb.
        assert_eq!(estimate_days_to_ladder_top(p.max_interval_index(), &p), 0);
        // From one rung below the top: 60 + 120.
        assert_eq!(estimate_days_to_ladder_top(p.max_interval_index() - 1, &p), 180);
        // The full ladder.
        assert_eq!(estimate_days_to_ladder_top(0, &p), 1 + 3 + 7 + 14 + 30 + 60 + 120);
    }
}
