//! Topic, ledger and rotation types.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the catalog, the ledger stores and the rotator.
#[derive(Debug, Error)]
pub enum TopicError {
    /// Catalog missing, unreadable or empty, or ledger present but malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Every catalog topic is already in the ledger.
    #[error("All {total} topics have been published")]
    Exhausted { total: usize },

    /// The ledger could not be durably written.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// A blog post subject. Compared by exact text, no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL/file friendly form: lowercase ASCII alphanumerics joined by `-`.
    pub fn slug(&self) -> String {
        slugify(&self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Topic {
    fn from(text: String) -> Self {
        Self(text)
    }
}

/// Lowercase, keep ASCII alphanumerics, collapse everything else into single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Published topics in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub published: Vec<Topic>,
}

impl Ledger {
    pub fn new(published: Vec<Topic>) -> Self {
        Self { published }
    }

    pub fn contains(&self, topic: &Topic) -> bool {
        self.published.iter().any(|t| t == topic)
    }

    /// Set view used for membership tests; duplicates collapse.
    pub fn as_set(&self) -> HashSet<&Topic> {
        self.published.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.published.len()
    }

    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }
}

/// What to do once every catalog topic has been published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Fail with [`TopicError::Exhausted`].
    #[default]
    Fail,
    /// Clear the ledger and start over from the first catalog topic.
    Reset,
}

/// Snapshot of the rotation, used by the topics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RotationStatus {
    pub total: usize,
    pub published: usize,
    pub remaining: usize,
    pub next: Option<Topic>,
    pub on_exhausted: ExhaustionPolicy,
}
