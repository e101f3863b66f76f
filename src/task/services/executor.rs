//! Task executor: drives an initialized task through a strategy run.

use crate::task::{
    domain::{FailureKind, Task, TaskDomainError, TaskFailure, TaskId, TaskState},
    ports::{
        ExecutionError, ExecutionJob, ExecutionStrategy, RepositoryManager, TaskEnvironment,
        TaskStore,
    },
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::registry::{RunReport, TaskRegistry, TaskRegistryError};
use super::runs::CANCELLED_BY_CALLER;

/// Time a cancelled strategy gets to stop before the task is failed anyway.
pub const DEFAULT_CANCELLATION_GRACE: Duration = Duration::from_secs(5);

/// Executor-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorSettings {
    timeout: Option<Duration>,
    cancellation_grace: Duration,
}

impl ExecutorSettings {
    /// Creates settings with no run timeout and the default grace period.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: None,
            cancellation_grace: DEFAULT_CANCELLATION_GRACE,
        }
    }

    /// Sets the timeout applied by [`TaskExecutor::execute_task`].
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how long a cancelled strategy may take to stop.
    #[must_use]
    pub const fn with_cancellation_grace(mut self, grace: Duration) -> Self {
        self.cancellation_grace = grace;
        self
    }
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Service-level errors for task execution.
#[derive(Debug, Error)]
pub enum TaskExecutorError {
    /// The task is not in a state the operation accepts.
    #[error("task {task_id} is {state}, which does not permit this operation")]
    InvalidState {
        /// Task identifier.
        task_id: TaskId,
        /// Current state.
        state: TaskState,
    },

    /// The strategy failed; the task is now `Failed`.
    #[error("execution of task {task_id} failed: {source}")]
    Execution {
        /// Task identifier.
        task_id: TaskId,
        /// Strategy failure.
        source: ExecutionError,
    },

    /// The run was cancelled; the task is now `Failed`.
    #[error("execution of task {0} was cancelled")]
    Cancelled(TaskId),

    /// The run did not finish in time; the task stays `Running`.
    #[error("execution of task {task_id} timed out after {after:?}")]
    Timeout {
        /// Task identifier.
        task_id: TaskId,
        /// Timeout that elapsed.
        after: Duration,
    },

    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] TaskRegistryError),
}

/// Result type for task executor operations.
pub type TaskExecutorResult<T> = Result<T, TaskExecutorError>;

/// Outcome of [`TaskExecutor::cancel_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// A live run was signalled; its `execute_task` call records the
    /// cancellation.
    Signalled,
    /// No live run existed, so the task was marked `Failed` directly.
    Abandoned(Task),
}

enum RunOutcome {
    Completed(Result<Value, ExecutionError>),
    Cancelled { acknowledged: bool },
    TimedOut,
}

/// Task executor service.
///
/// Runs are not retried. Concurrent executions of one task are rejected by
/// the registry's state check, so at most one run per task is live. Live
/// runs are tracked by the registry, so any executor sharing it can cancel
/// them.
pub struct TaskExecutor<X, S, M, E, C>
where
    X: ExecutionStrategy,
    S: TaskStore,
    M: RepositoryManager,
    E: TaskEnvironment,
    C: Clock + Send + Sync,
{
    registry: Arc<TaskRegistry<S, M, E, C>>,
    strategy: Arc<X>,
    settings: ExecutorSettings,
}

impl<X, S, M, E, C> TaskExecutor<X, S, M, E, C>
where
    X: ExecutionStrategy,
    S: TaskStore,
    M: RepositoryManager,
    E: TaskEnvironment,
    C: Clock + Send + Sync,
{
    /// Creates an executor with default settings.
    #[must_use]
    pub fn new(registry: Arc<TaskRegistry<S, M, E, C>>, strategy: Arc<X>) -> Self {
        Self {
            registry,
            strategy,
            settings: ExecutorSettings::default(),
        }
    }

    /// Replaces the executor settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: ExecutorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the registry the executor records transitions through.
    #[must_use]
    pub const fn registry(&self) -> &Arc<TaskRegistry<S, M, E, C>> {
        &self.registry
    }

    /// Runs an initialized task with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TaskExecutorError::InvalidState`] unless the task is
    /// `Initialized`, [`TaskExecutorError::Execution`] or
    /// [`TaskExecutorError::Cancelled`] after recording a failure, and
    /// [`TaskExecutorError::Timeout`] when the run outlives the timeout.
    pub async fn execute_task(&self, task_id: TaskId) -> TaskExecutorResult<Task> {
        self.execute(task_id, self.settings.timeout).await
    }

    /// Runs an initialized task with an explicit timeout.
    ///
    /// # Errors
    ///
    /// As for [`TaskExecutor::execute_task`].
    pub async fn execute_task_with_timeout(
        &self,
        task_id: TaskId,
        timeout: Duration,
    ) -> TaskExecutorResult<Task> {
        self.execute(task_id, Some(timeout)).await
    }

    /// Cancels a running task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskExecutorError::InvalidState`] when the task is not
    /// `Running`.
    pub async fn cancel_task(&self, task_id: TaskId) -> TaskExecutorResult<CancelOutcome> {
        let abandoned = self
            .registry
            .cancel_running(task_id)
            .await
            .map_err(invalid_state)?;
        Ok(abandoned.map_or(CancelOutcome::Signalled, CancelOutcome::Abandoned))
    }

    async fn execute(
        &self,
        task_id: TaskId,
        timeout: Option<Duration>,
    ) -> TaskExecutorResult<Task> {
        let token = CancellationToken::new();
        let (running, run) = self
            .registry
            .begin_execution(task_id, token.clone())
            .await
            .map_err(invalid_state)?;

        let outcome = self
            .drive(&ExecutionJob::from_task(&running), token.clone(), timeout)
            .await;
        let mut execution_error = None;
        let report = match outcome {
            RunOutcome::Completed(Ok(result)) => RunReport::Finished(Ok(result)),
            RunOutcome::Completed(Err(ExecutionError::Cancelled)) => {
                RunReport::Finished(Err(cancellation(true)))
            }
            RunOutcome::Completed(Err(source)) => {
                let failure = TaskFailure::new(FailureKind::Execution, source.to_string());
                execution_error = Some(source);
                RunReport::Finished(Err(failure))
            }
            RunOutcome::Cancelled { acknowledged } => {
                RunReport::Finished(Err(cancellation(acknowledged)))
            }
            RunOutcome::TimedOut => RunReport::TimedOut,
        };

        let recorded = self.registry.finish_execution(run, report).await?;
        match recorded.state() {
            TaskState::Succeeded => Ok(recorded),
            TaskState::Running => {
                token.cancel();
                let after = timeout.unwrap_or_default();
                tracing::warn!(task_id = %task_id, ?after, "task run timed out; task left running");
                Err(TaskExecutorError::Timeout { task_id, after })
            }
            _ => Err(match execution_error {
                Some(source)
                    if recorded
                        .error()
                        .is_some_and(|failure| failure.kind() == FailureKind::Execution) =>
                {
                    TaskExecutorError::Execution { task_id, source }
                }
                _ => TaskExecutorError::Cancelled(task_id),
            }),
        }
    }

    async fn drive(
        &self,
        job: &ExecutionJob,
        token: CancellationToken,
        timeout: Option<Duration>,
    ) -> RunOutcome {
        let run = self.strategy.run(job, token.clone());
        tokio::pin!(run);
        let deadline = async {
            match timeout {
                Some(after) => tokio::time::sleep(after).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        tokio::select! {
            result = &mut run => RunOutcome::Completed(result),
            () = token.cancelled() => {
                let grace = self.settings.cancellation_grace;
                let acknowledged = tokio::time::timeout(grace, &mut run).await.is_ok();
                RunOutcome::Cancelled { acknowledged }
            }
            () = &mut deadline => RunOutcome::TimedOut,
        }
    }
}

fn cancellation(acknowledged: bool) -> TaskFailure {
    let message = if acknowledged {
        CANCELLED_BY_CALLER.to_owned()
    } else {
        format!("{CANCELLED_BY_CALLER}; strategy did not stop within the grace period")
    };
    TaskFailure::new(FailureKind::Cancelled, message)
}

fn invalid_state(err: TaskRegistryError) -> TaskExecutorError {
    match err {
        TaskRegistryError::Domain(TaskDomainError::InvalidStateTransition {
            task_id, from, ..
        }) => TaskExecutorError::InvalidState {
            task_id,
            state: from,
        },
        other => other.into(),
    }
}
