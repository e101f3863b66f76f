//! Explicit registration table mapping toolkit names to constructors.

use crate::agent::domain::{AgentDomainError, ToolDescriptor, Toolkit, ToolkitName};
use std::collections::BTreeMap;

/// Constructor invoked to build a toolkit for a run.
pub type ToolkitConstructor = fn(ToolkitName) -> Toolkit;

/// Registry of toolkit constructors, validated at startup.
///
/// # Examples
///
///     use taskpilot::agent::{domain::ToolkitName, services::ToolkitRegistry};
///
///     let registry = ToolkitRegistry::with_defaults();
///     let name = ToolkitName::new("python_indexer").expect("valid name");
///     assert!(registry.validate(&[name]).is_ok());
#[derive(Debug, Clone, Default)]
pub struct ToolkitRegistry {
    constructors: BTreeMap<ToolkitName, ToolkitConstructor>,
}

impl ToolkitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in code-agent toolkits.
    #[must_use]
    pub fn with_defaults() -> Self {
        let defaults: [(&str, ToolkitConstructor); 5] = [
            ("python_indexer", python_indexer),
            ("python_writer", python_writer),
            ("codebase_oracle", codebase_oracle),
            ("context_oracle", context_oracle),
            ("documentation_gpt", documentation_gpt),
        ];
        let constructors = defaults
            .into_iter()
            .filter_map(|(name, constructor)| {
                ToolkitName::new(name)
                    .ok()
                    .map(|toolkit| (toolkit, constructor))
            })
            .collect();
        Self { constructors }
    }

    /// Registers a toolkit constructor.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed name, or
    /// [`AgentDomainError::DuplicateToolkit`] when the name is taken.
    pub fn register(
        &mut self,
        name: &str,
        constructor: ToolkitConstructor,
    ) -> Result<(), AgentDomainError> {
        let toolkit = ToolkitName::new(name)?;
        if self.constructors.contains_key(&toolkit) {
            return Err(AgentDomainError::DuplicateToolkit(toolkit));
        }
        self.constructors.insert(toolkit, constructor);
        Ok(())
    }

    /// Returns whether a constructor exists for the toolkit.
    #[must_use]
    pub fn contains(&self, name: &ToolkitName) -> bool {
        self.constructors.contains_key(name)
    }

    /// Returns the registered toolkit names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &ToolkitName> {
        self.constructors.keys()
    }

    /// Checks that every requested toolkit is registered.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::UnknownToolkit`] for the first name with
    /// no constructor.
    pub fn validate(&self, names: &[ToolkitName]) -> Result<(), AgentDomainError> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(unknown) => Err(AgentDomainError::UnknownToolkit(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Builds the requested toolkits in request order.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::UnknownToolkit`] for the first name with
    /// no constructor.
    pub fn build(&self, names: &[ToolkitName]) -> Result<Vec<Toolkit>, AgentDomainError> {
        names
            .iter()
            .map(|name| {
                self.constructors
                    .get(name)
                    .map(|constructor| constructor(name.clone()))
                    .ok_or_else(|| AgentDomainError::UnknownToolkit(name.clone()))
            })
            .collect()
    }
}

fn python_indexer(name: ToolkitName) -> Toolkit {
    Toolkit::new(
        name,
        [
            ToolDescriptor::new(
                "python-indexer-retrieve-code",
                "Returns the source code of a module, class, or function.",
            ),
            ToolDescriptor::new(
                "python-indexer-retrieve-docstring",
                "Returns the docstring of a module, class, or function.",
            ),
            ToolDescriptor::new(
                "python-indexer-retrieve-raw-code",
                "Returns the raw source including comments and docstrings.",
            ),
        ],
    )
}

fn python_writer(name: ToolkitName) -> Toolkit {
    Toolkit::new(
        name,
        [ToolDescriptor::new(
            "python-writer-update-module",
            "Creates or updates a module, class, or function from supplied code.",
        )],
    )
}

fn codebase_oracle(name: ToolkitName) -> Toolkit {
    Toolkit::new(
        name,
        [ToolDescriptor::new(
            "codebase-oracle-agent",
            "Answers questions about the codebase using retrieval over indexed sources.",
        )],
    )
}

fn context_oracle(name: ToolkitName) -> Toolkit {
    Toolkit::new(
        name,
        [ToolDescriptor::new(
            "context-oracle",
            "Returns the symbols most similar to a query from the embedding index.",
        )],
    )
}

fn documentation_gpt(name: ToolkitName) -> Toolkit {
    Toolkit::new(
        name,
        [ToolDescriptor::new(
            "doc-gpt-lookup",
            "Vector search over the specified API documentation.",
        )],
    )
}
