//! Error types for agent configuration and instruction validation.

use super::ToolkitName;
use thiserror::Error;

/// Errors returned while constructing agent domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// The instruction text is empty after trimming.
    #[error("instruction text must not be empty")]
    EmptyInstructions,

    /// One or more required instruction variables were not supplied.
    #[error("missing instruction variables: {}", .0.join(", "))]
    MissingInstructionVariables(Vec<String>),

    /// The instruction template could not be rendered.
    #[error("instruction template error: {0}")]
    InstructionTemplate(String),

    /// The model identifier is not supported.
    #[error("unsupported model '{0}'")]
    UnsupportedModel(String),

    /// The agent name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyAgentName,

    /// The session identifier is empty after trimming.
    #[error("session identifier must not be empty when provided")]
    EmptySessionId,

    /// The iteration budget must be positive.
    #[error("max_iters must be a positive integer")]
    ZeroMaxIterations,

    /// The toolkit name is empty after trimming.
    #[error("toolkit name must not be empty")]
    EmptyToolkitName,

    /// The toolkit name contains characters outside `[a-z0-9_]`.
    #[error(
        "toolkit name '{0}' contains invalid characters (only lowercase alphanumeric and underscores allowed)"
    )]
    InvalidToolkitName(String),

    /// The same toolkit was listed or registered twice.
    #[error("duplicate toolkit: {0}")]
    DuplicateToolkit(ToolkitName),

    /// The toolkit has no registered constructor.
    #[error("unknown toolkit: {0}")]
    UnknownToolkit(ToolkitName),
}
