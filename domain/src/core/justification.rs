//! Justification value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The written reason attached to a vote, resolution or grid move (Value Object)
///
/// Never empty: every recorded change must say why it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Justification {
    content: String,
}

impl Justification {
    /// Create a justification, rejecting blank text
    pub fn new(content: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_min_len(content, 1)
    }

    /// Create a justification that must carry at least `min_len` characters
    /// once surrounding whitespace is trimmed
    pub fn with_min_len(content: impl Into<String>, min_len: usize) -> Result<Self, DomainError> {
        let content = content.into().trim().to_string();
        if content.is_empty() {
            return Err(DomainError::validation("justification cannot be empty"));
        }
        if content.chars().count() < min_len {
            return Err(DomainError::validation(format!(
                "justification must have at least {min_len} characters"
            )));
        }
        Ok(Self { content })
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn into_inner(self) -> String {
        self.content
    }
}

impl TryFrom<String> for Justification {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Justification::new(value)
    }
}

impl From<Justification> for String {
    fn from(justification: Justification) -> Self {
        justification.content
    }
}

impl AsRef<str> for Justification {
    fn as_ref(&self) -> &str {
        &self.content
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}
