//! Toolkit names and tool descriptors.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated toolkit name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolkitName(String);

impl ToolkitName {
    /// Creates a validated toolkit name.
    ///
    /// The input is trimmed and lowercased. Only characters in `[a-z0-9_]`
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyToolkitName`] or
    /// [`AgentDomainError::InvalidToolkitName`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let normalized = value.into().trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(AgentDomainError::EmptyToolkitName);
        }

        let is_valid = normalized.chars().all(|character| {
            character.is_ascii_lowercase() || character.is_ascii_digit() || character == '_'
        });
        if !is_valid {
            return Err(AgentDomainError::InvalidToolkitName(normalized));
        }

        Ok(Self(normalized))
    }

    /// Returns the toolkit name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ToolkitName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ToolkitName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single tool made available to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    name: String,
    description: String,
}

impl ToolDescriptor {
    /// Creates a tool descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description shown to the agent.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A named group of tools built by a registered constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolkit {
    name: ToolkitName,
    tools: Vec<ToolDescriptor>,
}

impl Toolkit {
    /// Creates a toolkit from its tools.
    #[must_use]
    pub fn new(name: ToolkitName, tools: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        Self {
            name,
            tools: tools.into_iter().collect(),
        }
    }

    /// Returns the toolkit name.
    #[must_use]
    pub const fn name(&self) -> &ToolkitName {
        &self.name
    }

    /// Returns the tools in this toolkit.
    #[must_use]
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }
}
