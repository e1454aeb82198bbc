//! Knowledge graph: concepts linked by prerequisite edges.
//!
//! The graph is an invariant DAG. Construction rejects cycles, and the value
//! is immutable afterwards, so every query is pure and stable across calls.
//! Replacing the graph means building a new value, which re-verifies
//! acyclicity.
//!
//! - [`index::KnowledgeGraph`]: the graph itself and its direct/transitive
//!   prerequisite and dependent queries
//! - [`traverse`]: order-sensitive walks (topological order, learning paths)

pub mod index;
pub mod traverse;

pub use index::KnowledgeGraph;
pub use traverse::{learning_path, topological_order};
