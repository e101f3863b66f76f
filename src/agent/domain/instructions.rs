//! Immutable instruction payloads handed to execution strategies.

use super::AgentDomainError;
use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Instruction text plus the template variables used to format it.
///
/// Payloads are only constructed through [`InstructionPayloadBuilder`], which
/// checks required variables before the value exists.
///
/// # Examples
///
///     use taskpilot::agent::domain::InstructionPayload;
///
///     let payload = InstructionPayload::builder("Index {{ overview }}")
///         .variable("overview", "the parser crate")
///         .require("overview")
///         .build()
///         .expect("valid payload");
///     assert_eq!(payload.render().expect("renders"), "Index the parser crate");
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionPayload {
    text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    variables: BTreeMap<String, String>,
}

impl InstructionPayload {
    /// Starts building a payload from instruction text.
    #[must_use]
    pub fn builder(text: impl Into<String>) -> InstructionPayloadBuilder {
        InstructionPayloadBuilder::new(text)
    }

    /// Returns the raw instruction text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the template variables.
    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Returns a single template variable, if present.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Renders the instruction text with its variables substituted.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::InstructionTemplate`] when the text is not
    /// a valid template or references a variable that was not supplied.
    pub fn render(&self) -> Result<String, AgentDomainError> {
        let mut environment = Environment::new();
        environment.set_undefined_behavior(UndefinedBehavior::Strict);
        environment
            .render_str(&self.text, &self.variables)
            .map_err(|err| AgentDomainError::InstructionTemplate(err.to_string()))
    }
}

/// Builder that validates an [`InstructionPayload`] before constructing it.
#[derive(Debug, Clone, Default)]
pub struct InstructionPayloadBuilder {
    text: String,
    variables: BTreeMap<String, String>,
    required: BTreeSet<String>,
}

impl InstructionPayloadBuilder {
    /// Creates a builder for the given instruction text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets a template variable, replacing any previous value.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Marks a template variable as required.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.insert(name.into());
        self
    }

    /// Validates the collected fields and builds the payload.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyInstructions`] when the text is blank
    /// and [`AgentDomainError::MissingInstructionVariables`] when a required
    /// variable was never set.
    pub fn build(self) -> Result<InstructionPayload, AgentDomainError> {
        let Self {
            text,
            variables,
            required,
        } = self;

        if text.trim().is_empty() {
            return Err(AgentDomainError::EmptyInstructions);
        }

        let missing: Vec<String> = required
            .into_iter()
            .filter(|name| !variables.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(AgentDomainError::MissingInstructionVariables(missing));
        }

        Ok(InstructionPayload { text, variables })
    }
}
