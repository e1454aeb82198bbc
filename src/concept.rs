//! Concept types: the atomic units of the knowledge graph.
//!
//! A concept (knowledge node) is identified by a stable, case-sensitive string
//! [`ConceptId`] and described by [`Concept`] metadata. Identifiers are opaque
//! keys; two concepts are equal iff their identifiers match.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Unique, case-sensitive identifier for a concept.
///
/// Wraps a `String` and orders lexicographically by bytes, which makes every
/// identifier-based tie-break in the engine deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(String);

impl ConceptId {
    /// Create a `ConceptId` from anything string-like.
    pub fn new(raw: impl Into<String>) -> Self {
        ConceptId(raw.into())
    }

    /// View the identifier as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConceptId {
    fn from(s: &str) -> Self {
        ConceptId(s.to_owned())
    }
}

impl From<String> for ConceptId {
    fn from(s: String) -> Self {
        ConceptId(s)
    }
}

impl Borrow<str> for ConceptId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A knowledge node: identifier plus human-facing metadata.
///
/// The metadata is opaque to the engine; only the identifier participates in
/// graph queries and score bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Stable identifier.
    pub id: ConceptId,
    /// Human-readable name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Optional worked example.
    pub example: Option<String>,
}

impl Concept {
    /// Create a concept with no description or example.
    pub fn new(id: impl Into<ConceptId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            example: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a worked example.
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_ids_are_case_sensitive() {
        assert_ne!(ConceptId::new("Loops"), ConceptId::new("loops"));
        assert_eq!(ConceptId::new("loops"), ConceptId::from("loops"));
    }

    #[test]
    fn concept_id_orders_lexicographically() {
        let a = ConceptId::new("algebra");
        let b = ConceptId::new("calculus");
        assert!(a < b);
    }

    #[test]
    fn concept_builder() {
        let c = Concept::new("py_fn", "Functions")
            .with_description("Defining and calling functions")
            .with_example("def add(a, b): return a + b");
        assert_eq!(c.id.as_str(), "py_fn");
        assert!(c.description.is_some());
        assert!(c.example.is_some());
    }

    #[test]
    fn concept_id_serde_is_transparent() {
        let id = ConceptId::new("loops");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"loops\"");
        let back: ConceptId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
