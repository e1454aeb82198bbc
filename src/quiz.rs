//! Quiz item types: identifiers, difficulty levels, and presentation content.
//!
//! Quiz identity is by [`QuizId`]; two items with the same identifier are the
//! same item. The engine reads `linked_concepts`, `difficulty`, and `style`;
//! [`QuizContent`] is carried opaquely for the presentation layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::concept::ConceptId;

/// Unique identifier for a quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    /// Create a `QuizId` from anything string-like.
    pub fn new(raw: impl Into<String>) -> Self {
        QuizId(raw.into())
    }

    /// View the identifier as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuizId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuizId {
    fn from(s: &str) -> Self {
        QuizId(s.to_owned())
    }
}

impl From<String> for QuizId {
    fn from(s: String) -> Self {
        QuizId(s)
    }
}

/// Raised when a difficulty level falls outside [1, 5].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("difficulty {0} is outside [{min}, {max}]", min = Difficulty::MIN.get(), max = Difficulty::MAX.get())]
pub struct InvalidDifficulty(pub u8);

/// Difficulty level of a quiz, an integer in [1, 5].
///
/// 1 is the easiest, 5 the hardest. The newtype guarantees the range at
/// construction, so band filtering never has to re-validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    /// Easiest level.
    pub const MIN: Difficulty = Difficulty(1);
    /// Hardest level.
    pub const MAX: Difficulty = Difficulty(5);

    /// Create a difficulty level, returning `None` if `raw` is outside [1, 5].
    pub fn new(raw: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0).contains(&raw).then_some(Difficulty(raw))
    }

    /// Get the underlying level.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = InvalidDifficulty;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Difficulty::new(raw).ok_or(InvalidDifficulty(raw))
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.0
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presentation content of a quiz question. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizContent {
    /// The question text.
    pub stem: String,
    /// Answer choices (empty for free-form styles).
    pub choices: Vec<String>,
    /// The correct answer.
    pub answer: String,
    /// Explanation shown after answering.
    pub explanation: String,
}

/// A quiz item in the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    /// Stable identifier; quiz identity is by this field alone.
    pub id: QuizId,
    /// The concepts this quiz exercises. Non-empty by bank contract.
    pub linked_concepts: Vec<ConceptId>,
    /// Difficulty level in [1, 5].
    pub difficulty: Difficulty,
    /// Free-form style tag, e.g. "multiple_choice" or "fill_in_blank".
    pub style: String,
    /// Presentation content, carried opaquely.
    pub content: QuizContent,
}

impl Quiz {
    /// Create a quiz with empty content.
    pub fn new(
        id: impl Into<QuizId>,
        linked_concepts: Vec<ConceptId>,
        difficulty: Difficulty,
        style: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            linked_concepts,
            difficulty,
            style: style.into(),
            content: QuizContent::default(),
        }
    }

    /// Attach presentation content.
    pub fn with_content(mut self, content: QuizContent) -> Self {
        self.content = content;
        self
    }

    /// Whether this quiz exercises the given concept.
    pub fn links(&self, concept: &ConceptId) -> bool {
        self.linked_concepts.iter().any(|c| c == concept)
    }
}
