//! Order-sensitive walks over the knowledge graph.
//!
//! Topological ordering and learning paths are free functions over a
//! [`KnowledgeGraph`] reference. Ties are broken by concept identifier
//! ascending, so identical graphs always yield identical orders.

use std::collections::{BTreeMap, BTreeSet};

use crate::concept::ConceptId;
use crate::error::GraphResult;

use super::index::KnowledgeGraph;

/// A topological order of all concepts: prerequisites before dependents.
///
/// Kahn's algorithm with the ready set kept ordered by concept id, which
/// pins down a single linearization among the valid ones.
pub fn topological_order(kg: &KnowledgeGraph) -> Vec<ConceptId> {
    let mut indegree: BTreeMap<ConceptId, usize> = kg
        .concept_ids()
        .iter()
        .map(|id| {
            let prereqs = kg
                .direct_prerequisites(id)
                .expect("concept listed by the graph");
            (id.clone(), prereqs.len())
        })
        .collect();

    let mut ready: BTreeSet<ConceptId> = indegree
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(id, _)| id.clone())
        .collect();

    let mut order = Vec::with_capacity(kg.concept_count());
    while let Some(next) = ready.pop_first() {
        let dependents = kg
            .direct_dependents(&next)
            .expect("concept listed by the graph");
        for dependent in dependents {
            let count = indegree
                .get_mut(&dependent)
                .expect("dependent listed by the graph");
            // The graph is a DAG by construction, so every count reaches zero.
            *count -= 1;
            if *count == 0 {
                ready.insert(dependent);
            }
        }
        order.push(next);
    }
    order
}

/// Ordered study path to `target`: all transitive prerequisites, then the
/// target itself, restricted to the topological order.
pub fn learning_path(kg: &KnowledgeGraph, target: &ConceptId) -> GraphResult<Vec<ConceptId>> {
    let prereqs = kg.transitive_prerequisites(target)?;
    Ok(topological_order(kg)
        .into_iter()
        .filter(|id| id == target || prereqs.contains(id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::Concept;

    fn concept(id: &str) -> Concept {
        Concept::new(id, id)
    }

    fn edge(p: &str, d: &str) -> (ConceptId, ConceptId) {
        (ConceptId::new(p), ConceptId::new(d))
    }

    #[test]
    fn topological_order_respects_edges() {
        let kg = KnowledgeGraph::build(
            ["basics", "loops", "recursion"].map(concept),
            [edge("basics", "loops"), edge("loops", "recursion")],
        )
        .unwrap();
        let ids = topological_order(&kg);
        let order: Vec<&str> = ids.iter().map(|c| c.as_str()).collect();
        assert_eq!(order, vec!["basics", "loops", "recursion"]);
    }

    #[test]
    fn topological_ties_break_by_id() {
        // No edges at all: the order must be plain id order.
        let kg = KnowledgeGraph::build(["c", "a", "b"].map(concept), []).unwrap();
        let ids = topological_order(&kg);
        let order: Vec<&str> = ids.iter().map(|c| c.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn topological_order_is_stable() {
        let kg = KnowledgeGraph::build(
            ["a", "b", "c", "d"].map(concept),
            [edge("a", "c"), edge("b", "c"), edge("c", "d")],
        )
        .unwrap();
        assert_eq!(topological_order(&kg), topological_order(&kg));
    }

    #[test]
    fn learning_path_covers_prerequisites_in_order() {
        let kg = KnowledgeGraph::build(
            ["basics", "loops", "arrays", "recursion"].map(concept),
            [
                edge("basics", "loops"),
                edge("basics", "arrays"),
                edge("loops", "recursion"),
            ],
        )
        .unwrap();
        let ids = learning_path(&kg, &ConceptId::new("recursion")).unwrap();
        let path: Vec<&str> = ids.iter().map(|c| c.as_str()).collect();
        // "arrays" is not upstream of recursion and must not appear.
        assert_eq!(path, vec!["basics", "loops", "recursion"]);
    }

    #[test]
    fn learning_path_for_root_is_just_the_root() {
        let kg = KnowledgeGraph::build(
            ["basics", "loops"].map(concept),
            [edge("basics", "loops")],
        )
        .unwrap();
        let path = learning_path(&kg, &ConceptId::new("basics")).unwrap();
        assert_eq!(path, vec![ConceptId::new("basics")]);
    }

    #[test]
    fn learning_path_unknown_target_errors() {
        let kg = KnowledgeGraph::build(["a"].map(concept), []).unwrap();
        assert!(learning_path(&kg, &ConceptId::new("ghost")).is_err());
    }
}
