//! Pre-validated agent configuration supplied when creating a task.

use super::{AgentDomainError, InstructionPayload, ToolkitName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Model used when the caller does not choose one.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Models accepted by [`ModelName::new`].
pub const SUPPORTED_MODELS: [&str; 2] = ["gpt-4", "gpt-3.5-turbo"];

/// Iteration budget used when the caller does not choose one.
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000;

/// Agent name used when the caller does not choose one.
pub const DEFAULT_AGENT_NAME: &str = "automata";

/// Validated model identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelName(String);

impl ModelName {
    /// Creates a validated model identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::UnsupportedModel`] when the model is not
    /// one of [`SUPPORTED_MODELS`].
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if !SUPPORTED_MODELS.contains(&normalized) {
            return Err(AgentDomainError::UnsupportedModel(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the model identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelName {
    fn default() -> Self {
        Self(DEFAULT_MODEL.to_owned())
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Agent configuration a task is created from.
///
/// Instances are produced by [`AgentConfigBuilder`] and are immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    name: String,
    model: ModelName,
    instructions: InstructionPayload,
    toolkits: Vec<ToolkitName>,
    session_id: Option<String>,
    max_iters: u64,
}

impl AgentConfig {
    /// Starts building a configuration around an instruction payload.
    #[must_use]
    pub fn builder(instructions: InstructionPayload) -> AgentConfigBuilder {
        AgentConfigBuilder::new(instructions)
    }

    /// Returns the agent name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the model identifier.
    #[must_use]
    pub const fn model(&self) -> &ModelName {
        &self.model
    }

    /// Returns the instruction payload.
    #[must_use]
    pub const fn instructions(&self) -> &InstructionPayload {
        &self.instructions
    }

    /// Returns the requested toolkits in request order.
    #[must_use]
    pub fn toolkits(&self) -> &[ToolkitName] {
        &self.toolkits
    }

    /// Returns the session identifier, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns the iteration budget.
    #[must_use]
    pub const fn max_iters(&self) -> u64 {
        self.max_iters
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone)]
pub struct AgentConfigBuilder {
    instructions: InstructionPayload,
    name: Option<String>,
    model: Option<String>,
    toolkits: Vec<String>,
    session_id: Option<String>,
    max_iters: Option<u64>,
}

impl AgentConfigBuilder {
    /// Creates a builder with default model, name, and iteration budget.
    #[must_use]
    pub const fn new(instructions: InstructionPayload) -> Self {
        Self {
            instructions,
            name: None,
            model: None,
            toolkits: Vec::new(),
            session_id: None,
            max_iters: None,
        }
    }

    /// Sets the agent name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Appends a toolkit name.
    #[must_use]
    pub fn toolkit(mut self, toolkit: impl Into<String>) -> Self {
        self.toolkits.push(toolkit.into());
        self
    }

    /// Appends toolkit names from a comma-separated list.
    #[must_use]
    pub fn toolkit_list(mut self, toolkits: &str) -> Self {
        self.toolkits.extend(
            toolkits
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
        );
        self
    }

    /// Sets the session identifier.
    #[must_use]
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Sets the iteration budget.
    #[must_use]
    pub const fn max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = Some(max_iters);
        self
    }

    /// Validates the collected fields and builds the configuration.
    ///
    /// Toolkit names are checked for syntax and uniqueness here; whether a
    /// constructor exists for them is checked against the toolkit registry
    /// when a task is created.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentDomainError`] for the first invalid field.
    pub fn build(self) -> Result<AgentConfig, AgentDomainError> {
        let Self {
            instructions,
            name,
            model,
            toolkits,
            session_id,
            max_iters,
        } = self;

        let name = match name {
            Some(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(AgentDomainError::EmptyAgentName);
                }
                trimmed.to_owned()
            }
            None => DEFAULT_AGENT_NAME.to_owned(),
        };

        let model = model.map_or_else(|| Ok(ModelName::default()), ModelName::new)?;

        let mut seen = BTreeSet::new();
        let mut validated_toolkits = Vec::with_capacity(toolkits.len());
        for raw in toolkits {
            let toolkit = ToolkitName::new(raw)?;
            if !seen.insert(toolkit.clone()) {
                return Err(AgentDomainError::DuplicateToolkit(toolkit));
            }
            validated_toolkits.push(toolkit);
        }

        let session_id = match session_id {
            Some(value) if value.trim().is_empty() => {
                return Err(AgentDomainError::EmptySessionId);
            }
            Some(value) => Some(value.trim().to_owned()),
            None => None,
        };

        let max_iters = max_iters.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iters == 0 {
            return Err(AgentDomainError::ZeroMaxIterations);
        }

        Ok(AgentConfig {
            name,
            model,
            instructions,
            toolkits: validated_toolkits,
            session_id,
            max_iters,
        })
    }
}
