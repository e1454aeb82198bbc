//! Candidate concept ordering: bank filtering, score partition, and the
//! prerequisite gating walk.
//!
//! The walk turns the weakness-ordered primary queue into a target sequence
//! that never surfaces a concept before its unmet prerequisites: a locked
//! candidate pushes its failing prerequisites to the queue front and is
//! deferred once, so the walk descends to the deepest unsatisfied concept.

use std::collections::{BTreeSet, VecDeque};

use crate::concept::ConceptId;
use crate::graph::KnowledgeGraph;
use crate::policy::Policy;
use crate::profile::LearnerProfile;
use crate::quiz::Quiz;

/// Minimum score for a direct prerequisite to count as met.
pub const PREREQUISITE_THRESHOLD: f64 = 0.0;

/// Keep only bank items whose linked concepts are all present in the graph.
///
/// Excluded items are logged at WARN; a bank/graph mismatch is data drift,
/// not an error.
pub fn filter_bank<'q>(graph: &KnowledgeGraph, bank: &'q [Quiz]) -> Vec<&'q Quiz> {
    bank.iter()
        .filter(|quiz| {
            let missing = graph.validate_concepts_exist(quiz.linked_concepts.iter());
            if missing.is_empty() {
                return true;
            }
            for concept in missing {
                tracing::warn!(
                    quiz_id = %quiz.id,
                    concept = %concept,
                    "quiz links a concept missing from the graph; excluding it"
                );
            }
            false
        })
        .collect()
}

/// Concept partition derived from the filtered bank and the profile.
#[derive(Debug)]
pub struct ConceptPools {
    /// Every concept referenced by a surviving bank item.
    pub universe: BTreeSet<ConceptId>,
    /// Universe concepts at or below the weak threshold.
    pub weak: BTreeSet<ConceptId>,
    /// Weak and in-progress universe concepts, weakest first, ties by id.
    pub primary_queue: Vec<ConceptId>,
}

/// Partition the bank's concept universe by effective score.
///
/// The primary queue is the union of the weak set and the in-progress set
/// (score strictly between neutral and mastery). With a weak threshold below
/// zero the two sets leave a gap; concepts falling in it are excluded.
pub fn concept_pools(
    bank: &[&Quiz],
    profile: &LearnerProfile,
    policy: &Policy,
) -> ConceptPools {
    let universe: BTreeSet<ConceptId> = bank
        .iter()
        .flat_map(|quiz| quiz.linked_concepts.iter().cloned())
        .collect();

    let weak: BTreeSet<ConceptId> = universe
        .iter()
        .filter(|concept| policy.is_weak(profile.score(concept)))
        .cloned()
        .collect();

    let in_progress: BTreeSet<ConceptId> = universe
        .iter()
        .filter(|concept| {
            let score = profile.score(concept);
            score > 0.0 && !policy.is_mastered(score)
        })
        .cloned()
        .collect();

    let mut primary: Vec<(f64, ConceptId)> = weak
        .union(&in_progress)
        .map(|concept| (profile.score(concept), concept.clone()))
        .collect();
    primary.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    ConceptPools {
        universe,
        weak,
        primary_queue: primary.into_iter().map(|(_, concept)| concept).collect(),
    }
}

/// Direct prerequisites of `concept` whose score falls below the met
/// threshold, ordered weakest first, ties by id.
pub fn unmet_prerequisites(
    graph: &KnowledgeGraph,
    profile: &LearnerProfile,
    concept: &ConceptId,
) -> Vec<ConceptId> {
    let Ok(prereqs) = graph.direct_prerequisites(concept) else {
        return Vec::new();
    };
    let mut unmet: Vec<(f64, ConceptId)> = prereqs
        .into_iter()
        .map(|p| (profile.score(&p), p))
        .filter(|(score, _)| *score < PREREQUISITE_THRESHOLD)
        .collect();
    unmet.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    unmet.into_iter().map(|(_, p)| p).collect()
}

/// Expand the primary queue into the gated target order.
///
/// Locked candidates inject their unmet prerequisites at the queue front
/// (preserving the prerequisites' own weakness order) and are deferred to the
/// back once; a candidate found locked a second time is dropped, which bounds
/// the walk because no score changes while it runs.
pub fn gating_walk(
    graph: &KnowledgeGraph,
    profile: &LearnerProfile,
    primary_queue: &[ConceptId],
) -> Vec<ConceptId> {
    let mut queue: VecDeque<ConceptId> = primary_queue.iter().cloned().collect();
    let mut deferred: BTreeSet<ConceptId> = BTreeSet::new();
    let mut emitted: BTreeSet<ConceptId> = BTreeSet::new();
    let mut order = Vec::new();

    while let Some(concept) = queue.pop_front() {
        if emitted.contains(&concept) {
            continue;
        }
        let unmet = unmet_prerequisites(graph, profile, &concept);
        if unmet.is_empty() {
            emitted.insert(concept.clone());
            order.push(concept);
            continue;
        }
        if deferred.insert(concept.clone()) {
            tracing::debug!(
                concept = %concept,
                blockers = ?unmet,
                "candidate locked by unmet prerequisites; walking up"
            );
            for prerequisite in unmet.into_iter().rev() {
                if !emitted.contains(&prerequisite) {
                    queue.push_front(prerequisite);
                }
            }
            queue.push_back(concept);
        }
    }
    order
}
