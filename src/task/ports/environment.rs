//! Port for preparing and reading a task's working environment.

use crate::task::domain::{FileChange, Task};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for working environment operations.
pub type EnvironmentResult<T> = Result<T, EnvironmentError>;

/// Working environment in which an agent edits a task's files.
#[async_trait]
pub trait TaskEnvironment: Send + Sync {
    /// Prepares the environment for the task.
    ///
    /// Called on first initialization and again on every retry, so
    /// implementations must tolerate an environment left by a failed run.
    async fn prepare(&self, task: &Task) -> EnvironmentResult<()>;

    /// Returns the files the agent changed for the task.
    async fn collect_changes(&self, task: &Task) -> EnvironmentResult<Vec<FileChange>>;
}

/// Errors returned by working environment adapters.
#[derive(Debug, Clone, Error)]
pub enum EnvironmentError {
    /// The environment could not be prepared.
    #[error("environment preparation failed: {0}")]
    Preparation(String),

    /// The environment has no workspace for the task.
    #[error("no workspace prepared for task")]
    MissingWorkspace,

    /// Filesystem or other I/O failure.
    #[error("environment I/O error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl EnvironmentError {
    /// Wraps an I/O error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
