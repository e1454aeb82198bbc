//! Per-target item choice: band filtering, widening, and the tie-break chain.
//!
//! Given a target concept and its difficulty band, the chooser narrows the
//! quizzes linked to the target through a fixed preference chain until one
//! item remains: style variety, item novelty, weak-concept coverage, lower
//! difficulty, then identifier order (or a seeded draw when the policy
//! carries an RNG seed).

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::{Rng, SeedableRng};

use crate::concept::ConceptId;
use crate::policy::Policy;
use crate::profile::LearnerProfile;
use crate::quiz::{Quiz, QuizId};

use super::band::DifficultyBand;

/// Chooses a quiz for one target concept out of the filtered bank.
pub struct ItemChooser<'a, 'q> {
    policy: &'a Policy,
    profile: &'a LearnerProfile,
    bank: &'a [&'q Quiz],
    weak: &'a BTreeSet<ConceptId>,
    by_id: HashMap<&'q QuizId, &'q Quiz>,
}

impl<'a, 'q> ItemChooser<'a, 'q> {
    /// Create a chooser over the filtered bank and the weak-concept set.
    pub fn new(
        policy: &'a Policy,
        profile: &'a LearnerProfile,
        bank: &'a [&'q Quiz],
        weak: &'a BTreeSet<ConceptId>,
    ) -> Self {
        let by_id = bank.iter().map(|&quiz| (&quiz.id, quiz)).collect();
        Self {
            policy,
            profile,
            bank,
            weak,
            by_id,
        }
    }

    /// Pick a quiz exercising `target` inside `band`, widening the band by one
    /// level and then to the full scale before giving up.
    ///
    /// Returns the chosen quiz and the band that finally matched.
    pub fn choose(
        &self,
        target: &ConceptId,
        band: DifficultyBand,
    ) -> Option<(&'q Quiz, DifficultyBand)> {
        let candidates: Vec<&'q Quiz> = self
            .bank
            .iter()
            .copied()
            .filter(|quiz| quiz.links(target))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        for attempt in [band, band.widened(), DifficultyBand::FULL] {
            let in_band: Vec<&'q Quiz> = candidates
                .iter()
                .copied()
                .filter(|quiz| attempt.contains(quiz.difficulty))
                .collect();
            if !in_band.is_empty() {
                return Some((self.tie_break(in_band, target), attempt));
            }
        }
        None
    }

    /// Apply the preference chain left to right; each step keeps its preferred
    /// subset only when that subset is non-empty.
    fn tie_break(&self, mut pool: Vec<&'q Quiz>, target: &ConceptId) -> &'q Quiz {
        let recent = self.profile.recent_attempts(None, self.policy.recent_window);
        let recent_ids: HashSet<&QuizId> = recent.iter().map(|a| &a.quiz_id).collect();
        // Styles are resolved through the current bank; attempts whose quiz
        // has left the bank contribute no style.
        let recent_styles: HashSet<&str> = recent
            .iter()
            .filter_map(|a| self.by_id.get(&a.quiz_id).map(|quiz| quiz.style.as_str()))
            .collect();

        prefer(&mut pool, |quiz| !recent_styles.contains(quiz.style.as_str()));
        prefer(&mut pool, |quiz| !recent_ids.contains(&quiz.id));

        let coverage = |quiz: &Quiz| {
            quiz.linked_concepts
                .iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .filter(|concept| *concept != target && self.weak.contains(*concept))
                .count()
        };
        if let Some(best) = pool.iter().map(|quiz| coverage(quiz)).max() {
            pool.retain(|quiz| coverage(quiz) == best);
        }

        if let Some(easiest) = pool.iter().map(|quiz| quiz.difficulty).min() {
            pool.retain(|quiz| quiz.difficulty == easiest);
        }

        if pool.len() > 1 {
            if let Some(seed) = self.policy.rng_seed {
                pool.sort_by(|a, b| a.id.cmp(&b.id));
                let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
                return pool[rng.gen_range(0..pool.len())];
            }
        }
        pool.into_iter()
            .min_by(|a, b| a.id.cmp(&b.id))
            .expect("tie-break pool never empties")
    }
}

/// Keep the subset matching `pred` when it is non-empty.
fn prefer<'q>(pool: &mut Vec<&'q Quiz>, pred: impl Fn(&Quiz) -> bool) {
    let preferred: Vec<&'q Quiz> = pool.iter().copied().filter(|q| pred(q)).collect();
    if !preferred.is_empty() {
        *pool = preferred;
    }
}
