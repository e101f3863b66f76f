//! Error types for task domain validation and parsing.

use super::{TaskId, TaskState};
use thiserror::Error;

/// Errors returned while constructing or transitioning domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The requested lifecycle transition is not permitted.
    #[error("invalid state transition for task {task_id}: {from} -> {to}")]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current state.
        from: TaskState,
        /// Requested target state.
        to: TaskState,
    },

    /// The branch name is empty or not a valid Git ref name.
    #[error("invalid branch name: '{0}'")]
    InvalidBranchName(String),

    /// The pull request number is invalid.
    #[error("invalid pull request number {0}, expected a positive integer")]
    InvalidPullRequestNumber(u64),

    /// The commit message is empty after trimming.
    #[error("commit message must not be empty")]
    EmptyCommitMessage,

    /// The pull request title is empty after trimming.
    #[error("pull request title must not be empty")]
    EmptyPullRequestTitle,

    /// A changed file path is empty, absolute, or escapes the workspace.
    #[error("invalid file path in change set: '{0}'")]
    InvalidFilePath(String),
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);
