//! Port for the pluggable behaviour that performs a task's work.

use crate::agent::domain::InstructionPayload;
use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Result type for execution strategy runs.
pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Input handed to an execution strategy for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionJob {
    task_id: TaskId,
    instructions: InstructionPayload,
    metadata: BTreeMap<String, String>,
}

impl ExecutionJob {
    /// Captures the task's instructions and metadata for a run.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            instructions: task.instructions().clone(),
            metadata: task.metadata().clone(),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the instruction payload.
    #[must_use]
    pub const fn instructions(&self) -> &InstructionPayload {
        &self.instructions
    }

    /// Returns a metadata value captured at creation, if present.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Behaviour invoked by the executor to perform a task's work.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    /// Runs the job and returns its result.
    ///
    /// Implementations should return [`ExecutionError::Cancelled`] promptly
    /// once `cancellation` fires.
    async fn run(
        &self,
        job: &ExecutionJob,
        cancellation: CancellationToken,
    ) -> ExecutionResult<Value>;
}

/// Errors returned by execution strategies.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// The work itself failed.
    #[error("execution failed: {0}")]
    Failed(String),

    /// The run stopped after observing cancellation.
    #[error("execution cancelled")]
    Cancelled,

    /// Infrastructure failure inside the strategy.
    #[error("execution runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ExecutionError {
    /// Wraps a runtime error from a strategy implementation.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
