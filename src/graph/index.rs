//! The prerequisite DAG and its traversal queries.
//!
//! Backed by `petgraph` with a concept-id side index for O(1) node lookups.
//! Transitive closures are memoized in `DashMap` caches; the graph itself is
//! immutable after construction, so cached results never go stale.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::concept::{Concept, ConceptId};
use crate::error::{GraphError, GraphResult};

/// Directed acyclic graph of concepts under the *prerequisite-of* relation.
///
/// An edge `p -> d` means `p` is a direct prerequisite of `d`. Construction
/// fails with [`GraphError::CycleDetected`] if the edge set contains any
/// directed cycle, naming one offending cycle.
pub struct KnowledgeGraph {
    graph: DiGraph<ConceptId, ()>,
    node_index: HashMap<ConceptId, NodeIndex>,
    concepts: HashMap<ConceptId, Concept>,
    /// All concept ids, sorted ascending. Kept so iteration order is stable.
    sorted_ids: Vec<ConceptId>,
    prereq_closure: DashMap<ConceptId, Arc<BTreeSet<ConceptId>>>,
    dependent_closure: DashMap<ConceptId, Arc<BTreeSet<ConceptId>>>,
}

impl KnowledgeGraph {
    /// Build a graph from concepts and `(prerequisite, dependent)` edges.
    ///
    /// Fails with [`GraphError::UnknownConcept`] if an edge references a
    /// concept not in the collection, and with [`GraphError::CycleDetected`]
    /// if the edges contain a directed cycle.
    pub fn build(
        concepts: impl IntoIterator<Item = Concept>,
        edges: impl IntoIterator<Item = (ConceptId, ConceptId)>,
    ) -> GraphResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_index = HashMap::new();
        let mut concept_map = HashMap::new();

        for concept in concepts {
            let id = concept.id.clone();
            if !node_index.contains_key(&id) {
                let idx = graph.add_node(id.clone());
                node_index.insert(id.clone(), idx);
            }
            concept_map.insert(id, concept);
        }

        for (prerequisite, dependent) in edges {
            let src = *node_index
                .get(&prerequisite)
                .ok_or_else(|| GraphError::UnknownConcept {
                    concept_id: prerequisite.clone(),
                })?;
            let dst = *node_index
                .get(&dependent)
                .ok_or_else(|| GraphError::UnknownConcept {
                    concept_id: dependent.clone(),
                })?;
            graph.add_edge(src, dst, ());
        }

        if let Some(cycle) = find_cycle(&graph) {
            return Err(GraphError::CycleDetected { cycle });
        }

        let mut sorted_ids: Vec<ConceptId> = node_index.keys().cloned().collect();
        sorted_ids.sort();

        Ok(Self {
            graph,
            node_index,
            concepts: concept_map,
            sorted_ids,
            prereq_closure: DashMap::new(),
            dependent_closure: DashMap::new(),
        })
    }

    /// Whether the graph contains the concept.
    pub fn contains(&self, id: &ConceptId) -> bool {
        self.node_index.contains_key(id)
    }

    /// Metadata for a concept, if present.
    pub fn concept(&self, id: &ConceptId) -> Option<&Concept> {
        self.concepts.get(id)
    }

    /// All concept ids, ascending.
    pub fn concept_ids(&self) -> &[ConceptId] {
        &self.sorted_ids
    }

    /// Number of concepts.
    pub fn concept_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of prerequisite edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The subset of `ids` not present in the graph, in input order.
    pub fn validate_concepts_exist<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ConceptId>,
    ) -> Vec<ConceptId> {
        ids.into_iter()
            .filter(|id| !self.contains(id))
            .cloned()
            .collect()
    }

    fn index_of(&self, id: &ConceptId) -> GraphResult<NodeIndex> {
        self.node_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownConcept {
                concept_id: id.clone(),
            })
    }

    /// Immediate upstream concepts: sources of incoming edges.
    pub fn direct_prerequisites(&self, id: &ConceptId) -> GraphResult<BTreeSet<ConceptId>> {
        let idx = self.index_of(id)?;
        Ok(self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| self.graph[e.source()].clone())
            .collect())
    }

    /// Immediate downstream concepts: targets of outgoing edges.
    pub fn direct_dependents(&self, id: &ConceptId) -> GraphResult<BTreeSet<ConceptId>> {
        let idx = self.index_of(id)?;
        Ok(self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| self.graph[e.target()].clone())
            .collect())
    }

    /// Upstream closure of `id`, excluding `id` itself.
    ///
    /// Memoized; repeated queries return the shared cached set.
    pub fn transitive_prerequisites(&self, id: &ConceptId) -> GraphResult<Arc<BTreeSet<ConceptId>>> {
        if let Some(cached) = self.prereq_closure.get(id) {
            return Ok(Arc::clone(cached.value()));
        }
        let closure = Arc::new(self.closure_from(id, Direction::Incoming)?);
        self.prereq_closure.insert(id.clone(), Arc::clone(&closure));
        Ok(closure)
    }

    /// Downstream closure of `id`, excluding `id` itself.
    pub fn transitive_dependents(&self, id: &ConceptId) -> GraphResult<Arc<BTreeSet<ConceptId>>> {
        if let Some(cached) = self.dependent_closure.get(id) {
            return Ok(Arc::clone(cached.value()));
        }
        let closure = Arc::new(self.closure_from(id, Direction::Outgoing)?);
        self.dependent_closure
            .insert(id.clone(), Arc::clone(&closure));
        Ok(closure)
    }

    fn closure_from(
        &self,
        id: &ConceptId,
        direction: Direction,
    ) -> GraphResult<BTreeSet<ConceptId>> {
        let start = self.index_of(id)?;
        let mut seen: BTreeSet<ConceptId> = BTreeSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            for edge in self.graph.edges_directed(node, direction) {
                let next = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                let next_id = &self.graph[next];
                if next_id != id && seen.insert(next_id.clone()) {
                    queue.push_back(next);
                }
            }
        }
        Ok(seen)
    }
}

/// Find one directed cycle, as an ordered node path, if any exists.
///
/// Detection uses Tarjan's strongly connected components; a component with
/// more than one member (or a self-loop) is a cycle. The reported path walks
/// the component along its smallest-id intra-component successors, so the
/// same graph always names the same cycle.
fn find_cycle(graph: &DiGraph<ConceptId, ()>) -> Option<Vec<ConceptId>> {
    for scc in tarjan_scc(graph) {
        if scc.len() == 1 {
            let node = scc[0];
            if graph.find_edge(node, node).is_some() {
                return Some(vec![graph[node].clone()]);
            }
            continue;
        }

        let members: BTreeSet<NodeIndex> = scc.iter().copied().collect();
        let start = *members
            .iter()
            .min_by(|a, b| graph[**a].cmp(&graph[**b]))
            .expect("non-empty component");

        let mut path = vec![start];
        let mut current = start;
        loop {
            let next = graph
                .edges_directed(current, Direction::Outgoing)
                .map(|e| e.target())
                .filter(|t| members.contains(t))
                .min_by(|a, b| graph[*a].cmp(&graph[*b]))
                .expect("every SCC member has an intra-component successor");
            if let Some(pos) = path.iter().position(|&n| n == next) {
                return Some(path[pos..].iter().map(|&n| graph[n].clone()).collect());
            }
            path.push(next);
            current = next;
        }
    }
    None
}

impl std::fmt::Debug for KnowledgeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeGraph")
            .field("concepts", &self.concept_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(id: &str) -> Concept {
        Concept::new(id, id.to_uppercase())
    }

    fn edge(p: &str, d: &str) -> (ConceptId, ConceptId) {
        (ConceptId::new(p), ConceptId::new(d))
    }

    /// a -> b -> d, a -> c -> d
    fn diamond() -> KnowledgeGraph {
        KnowledgeGraph::build(
            ["a", "b", "c", "d"].map(concept),
            [edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")],
        )
        .unwrap()
    }

    #[test]
    fn build_and_query() {
        let kg = diamond();
        assert_eq!(kg.concept_count(), 4);
        assert_eq!(kg.edge_count(), 4);
        assert!(kg.contains(&ConceptId::new("a")));
        assert!(!kg.contains(&ConceptId::new("z")));
        assert_eq!(kg.concept(&ConceptId::new("a")).unwrap().name, "A");
    }

    #[test]
    fn direct_prerequisites_are_incoming_sources() {
        let kg = diamond();
        let prereqs = kg.direct_prerequisites(&ConceptId::new("d")).unwrap();
        assert_eq!(
            prereqs,
            BTreeSet::from([ConceptId::new("b"), ConceptId::new("c")])
        );
        assert!(kg.direct_prerequisites(&ConceptId::new("a")).unwrap().is_empty());
    }

    #[test]
    fn direct_dependents_are_outgoing_targets() {
        let kg = diamond();
        let deps = kg.direct_dependents(&ConceptId::new("a")).unwrap();
        assert_eq!(
            deps,
            BTreeSet::from([ConceptId::new("b"), ConceptId::new("c")])
        );
    }

    #[test]
    fn transitive_prerequisites_exclude_self() {
        let kg = diamond();
        let closure = kg.transitive_prerequisites(&ConceptId::new("d")).unwrap();
        assert_eq!(
            *closure,
            BTreeSet::from([ConceptId::new("a"), ConceptId::new("b"), ConceptId::new("c")])
        );
        assert!(!closure.contains(&ConceptId::new("d")));
    }

    #[test]
    fn transitive_dependents_walk_downstream() {
        let kg = diamond();
        let closure = kg.transitive_dependents(&ConceptId::new("a")).unwrap();
        assert_eq!(
            *closure,
            BTreeSet::from([ConceptId::new("b"), ConceptId::new("c"), ConceptId::new("d")])
        );
    }

    #[test]
    fn closure_queries_are_stable_across_calls() {
        let kg = diamond();
        let first = kg.transitive_prerequisites(&ConceptId::new("d")).unwrap();
        let second = kg.transitive_prerequisites(&ConceptId::new("d")).unwrap();
        assert_eq!(*first, *second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cycle_is_rejected_and_named() {
        let err = KnowledgeGraph::build(
            ["a", "b", "c"].map(concept),
            [edge("a", "b"), edge("b", "c"), edge("c", "a")],
        )
        .unwrap_err();
        match err {
            GraphError::CycleDetected { cycle } => {
                assert_eq!(cycle.len(), 3);
                assert!(cycle.contains(&ConceptId::new("a")));
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let err =
            KnowledgeGraph::build(["a"].map(concept), [edge("a", "a")]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::CycleDetected { cycle } if cycle == vec![ConceptId::new("a")]
        ));
    }

    #[test]
    fn edge_to_missing_concept_is_rejected() {
        let err = KnowledgeGraph::build(["a"].map(concept), [edge("a", "ghost")]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnknownConcept { concept_id } if concept_id == ConceptId::new("ghost")
        ));
    }

    #[test]
    fn validate_concepts_exist_returns_missing_subset() {
        let kg = diamond();
        let ids = [ConceptId::new("a"), ConceptId::new("x"), ConceptId::new("y")];
        let missing = kg.validate_concepts_exist(ids.iter());
        assert_eq!(missing, vec![ConceptId::new("x"), ConceptId::new("y")]);
    }

    #[test]
    fn concept_ids_are_sorted() {
        let kg = KnowledgeGraph::build(["c", "a", "b"].map(concept), []).unwrap();
        let ids: Vec<&str> = kg.concept_ids().iter().map(|c| c.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
