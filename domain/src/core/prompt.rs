//! Prompt value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A user prompt that has passed validation (Value Object)
///
/// Holds the text exactly as typed; only the emptiness check trims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    content: String,
}

impl Prompt {
    /// Validate and wrap the prompt text
    ///
    /// Fails with [`DomainError::InvalidInput`] when the content is empty or
    /// only whitespace.
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::InvalidInput("prompt is empty".to_string()));
        }
        Ok(Self { content })
    }

    /// Get the prompt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for Prompt {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Prompt::try_new(s)
    }
}

impl TryFrom<String> for Prompt {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Prompt::try_new(s)
    }
}
