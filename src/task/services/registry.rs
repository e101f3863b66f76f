//! Task registry: the single owner of task state transitions.

use crate::agent::{
    domain::{AgentConfig, AgentDomainError},
    services::ToolkitRegistry,
};
use crate::task::{
    adapters::TracingTaskEventSink,
    domain::{
        BranchName, CommitStep, FailureKind, FileChange, PullRequestRef, Task, TaskDomainError,
        TaskFailure, TaskId, TaskState, metadata,
    },
    ports::{
        EnvironmentError, RemoteError, RemoteResult, RepositoryManager, TaskEnvironment,
        TaskEvent, TaskEventSink, TaskSnapshot, TaskStore, TaskStoreError,
    },
};
use mockable::Clock;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::locks::TaskLocks;
use super::runs::{ActiveRun, ActiveRuns, CANCELLED_BY_CALLER};
use tokio_util::sync::CancellationToken;

/// Remote call timeout used when a commit request does not set one.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(60);

/// Registry-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    base_branch: BranchName,
    remote_timeout: Duration,
}

impl RegistrySettings {
    /// Creates settings with an explicit base branch and remote timeout.
    #[must_use]
    pub const fn new(base_branch: BranchName, remote_timeout: Duration) -> Self {
        Self {
            base_branch,
            remote_timeout,
        }
    }

    /// Returns the branch new commit branches start from.
    #[must_use]
    pub const fn base_branch(&self) -> &BranchName {
        &self.base_branch
    }

    /// Returns the default timeout for each repository manager call.
    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        self.remote_timeout
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_branch: BranchName::default_base(),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

/// Request payload for committing a succeeded task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitTaskRequest {
    task_id: TaskId,
    commit_message: String,
    pull_request_title: String,
    pull_request_body: String,
    branch_name: String,
    timeout: Option<Duration>,
}

impl CommitTaskRequest {
    /// Creates a commit request.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        commit_message: impl Into<String>,
        pull_request_title: impl Into<String>,
        pull_request_body: impl Into<String>,
        branch_name: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            commit_message: commit_message.into(),
            pull_request_title: pull_request_title.into(),
            pull_request_body: pull_request_body.into(),
            branch_name: branch_name.into(),
            timeout: None,
        }
    }

    /// Overrides the timeout applied to each repository manager call.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the task to commit.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// Service-level errors for task registry operations.
#[derive(Debug, Error)]
pub enum TaskRegistryError {
    /// Domain validation or a lifecycle transition check failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// The agent configuration was rejected.
    #[error(transparent)]
    Config(#[from] AgentDomainError),

    /// No task exists with the identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The working environment could not be prepared.
    #[error("environment error for task {task_id}: {source}")]
    Environment {
        /// Task identifier.
        task_id: TaskId,
        /// Underlying environment failure.
        source: EnvironmentError,
    },

    /// The commit sequence failed and the task is now `CommitFailed`.
    #[error("commit of task {task_id} failed at {step} on branch {branch}: {reason}")]
    Commit {
        /// Task identifier.
        task_id: TaskId,
        /// Step that failed.
        step: CommitStep,
        /// Branch the sequence targeted.
        branch: BranchName,
        /// Why the step failed.
        reason: CommitFailureReason,
    },

    /// A repository manager call did not finish in time; the task is
    /// unchanged.
    #[error("task {task_id} timed out after {after:?} during {step} on branch {branch}")]
    Timeout {
        /// Task identifier.
        task_id: TaskId,
        /// Step that was in flight.
        step: CommitStep,
        /// Branch the sequence targeted.
        branch: BranchName,
        /// Timeout that elapsed.
        after: Duration,
    },

    /// The task store failed.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for TaskRegistryError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(task_id) => Self::NotFound(task_id),
            other @ TaskStoreError::Persistence(_) => Self::Store(other),
        }
    }
}

/// Cause of a failed commit step.
#[derive(Debug, Clone, Error)]
pub enum CommitFailureReason {
    /// The repository manager reported an error.
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// Changed files could not be read from the environment.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

/// Result type for task registry operations.
pub type TaskRegistryResult<T> = Result<T, TaskRegistryError>;

/// How a run ended, as reported by the executor.
pub(crate) enum RunReport {
    /// The run produced a result or a failure.
    Finished(Result<Value, TaskFailure>),
    /// The run outlived its timeout; the task stays `Running`.
    TimedOut,
}

enum CommitAbort {
    Failed {
        step: CommitStep,
        reason: CommitFailureReason,
    },
    TimedOut {
        step: CommitStep,
        after: Duration,
    },
}

/// Task registry service.
///
/// Every transition is checked against the lifecycle table under the task's
/// lock, persisted through the store, and reported to the event sink.
pub struct TaskRegistry<S, M, E, C>
where
    S: TaskStore,
    M: RepositoryManager,
    E: TaskEnvironment,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    repository: Arc<M>,
    environment: Arc<E>,
    clock: Arc<C>,
    toolkits: Arc<ToolkitRegistry>,
    events: Arc<dyn TaskEventSink>,
    locks: TaskLocks,
    runs: ActiveRuns,
    settings: RegistrySettings,
}

impl<S, M, E, C> TaskRegistry<S, M, E, C>
where
    S: TaskStore,
    M: RepositoryManager,
    E: TaskEnvironment,
    C: Clock + Send + Sync,
{
    /// Creates a registry with default toolkits, tracing events, and
    /// default settings.
    #[must_use]
    pub fn new(store: Arc<S>, repository: Arc<M>, environment: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            store,
            repository,
            environment,
            clock,
            toolkits: Arc::new(ToolkitRegistry::with_defaults()),
            events: Arc::new(TracingTaskEventSink),
            locks: TaskLocks::new(),
            runs: ActiveRuns::default(),
            settings: RegistrySettings::default(),
        }
    }

    /// Replaces the toolkit registry used to validate configurations.
    #[must_use]
    pub fn with_toolkits(mut self, toolkits: Arc<ToolkitRegistry>) -> Self {
        self.toolkits = toolkits;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn TaskEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Replaces the registry settings.
    #[must_use]
    pub fn with_settings(mut self, settings: RegistrySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the registry settings.
    #[must_use]
    pub const fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    /// Creates a task from an agent configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Config`] when a toolkit is not registered,
    /// or [`TaskRegistryError::Store`] when persistence fails.
    pub async fn create_task(&self, config: &AgentConfig) -> TaskRegistryResult<TaskId> {
        self.toolkits.validate(config.toolkits())?;
        let task = Task::new(
            config.instructions().clone(),
            metadata::from_config(config),
            &*self.clock,
        );
        self.store.put(&task).await?;
        self.events.emit(&TaskEvent::Created { task_id: task.id() });
        Ok(task.id())
    }

    /// Returns the current record of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::NotFound`] for an unknown identifier.
    pub async fn get_task(&self, task_id: TaskId) -> TaskRegistryResult<Task> {
        Ok(self.store.get(task_id).await?)
    }

    /// Returns a snapshot of every task in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Store`] when persistence fails.
    pub async fn list_tasks(&self) -> TaskRegistryResult<TaskSnapshot> {
        Ok(self.store.list_all().await?)
    }

    /// Prepares the task's working environment.
    ///
    /// Valid from `Created` and, as an explicit retry, from `Failed`. A
    /// failed preparation leaves the task `Failed` with an environment error.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Domain`] from other states and
    /// [`TaskRegistryError::Environment`] when preparation fails.
    pub async fn initialize_task(&self, task_id: TaskId) -> TaskRegistryResult<Task> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.store.get(task_id).await?;
        let from = task.state();
        ensure_transition(&task, TaskState::Initialized)?;

        match self.environment.prepare(&task).await {
            Ok(()) => {
                task.mark_initialized(&*self.clock)?;
                self.persist_transition(&task, from).await?;
                Ok(task)
            }
            Err(source) => {
                let failure = TaskFailure::new(FailureKind::Environment, source.to_string());
                if from == TaskState::Failed {
                    task.replace_failure(failure, &*self.clock)?;
                    self.store.put(&task).await?;
                } else {
                    task.mark_failed(failure, &*self.clock)?;
                    self.persist_transition(&task, from).await?;
                }
                Err(TaskRegistryError::Environment { task_id, source })
            }
        }
    }

    /// Moves an `Initialized` task to `Running` and registers its run.
    ///
    /// The run's token is registered under the task lock, so a concurrent
    /// [`TaskRegistry::cancel_running`] either sees the live run or the
    /// task before it started.
    pub(crate) async fn begin_execution(
        &self,
        task_id: TaskId,
        token: CancellationToken,
    ) -> TaskRegistryResult<(Task, ActiveRun)> {
        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.store.get(task_id).await?;
        let from = task.state();
        task.mark_running(&*self.clock)?;
        self.persist_transition(&task, from).await?;
        Ok((task, self.runs.register(task_id, token)))
    }

    /// Cancels a `Running` task under its lock.
    ///
    /// A live run registered with this registry is signalled and `None` is
    /// returned; that run records the cancellation when it finishes. With no
    /// live run the task is failed directly and returned.
    pub(crate) async fn cancel_running(
        &self,
        task_id: TaskId,
    ) -> TaskRegistryResult<Option<Task>> {
        let _guard = self.locks.acquire(task_id).await;
        if self.runs.signal(task_id) {
            return Ok(None);
        }
        let mut task = self.store.get(task_id).await?;
        let from = task.state();
        if from != TaskState::Running {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id,
                from,
                to: TaskState::Failed,
            }
            .into());
        }
        task.mark_failed(
            TaskFailure::new(
                FailureKind::Cancelled,
                "cancelled while no run was active in this process",
            ),
            &*self.clock,
        )?;
        self.persist_transition(&task, from).await?;
        Ok(Some(task))
    }

    /// Records how a run ended and releases its registration.
    ///
    /// A run whose token was cancelled before this call took the lock is
    /// recorded as cancelled whatever it reported. A timed-out run that was
    /// not cancelled leaves the task `Running`.
    pub(crate) async fn finish_execution(
        &self,
        run: ActiveRun,
        report: RunReport,
    ) -> TaskRegistryResult<Task> {
        let task_id = run.task_id();
        let _guard = self.locks.acquire(task_id).await;
        let cancelled = run.is_cancelled();
        drop(run);
        let mut task = self.store.get(task_id).await?;
        let from = task.state();
        let outcome = match report {
            RunReport::Finished(Err(failure)) if failure.kind() == FailureKind::Cancelled => {
                Err(failure)
            }
            _ if cancelled => Err(TaskFailure::new(FailureKind::Cancelled, CANCELLED_BY_CALLER)),
            RunReport::Finished(outcome) => outcome,
            RunReport::TimedOut => return Ok(task),
        };
        match outcome {
            Ok(result) => task.mark_succeeded(result, &*self.clock)?,
            Err(failure) => task.mark_failed(failure, &*self.clock)?,
        }
        self.persist_transition(&task, from).await?;
        Ok(task)
    }

    /// Commits a succeeded task's changes and opens a pull request.
    ///
    /// Runs create-branch, commit, and open-pull-request in order, each under
    /// the request timeout. Progress is recorded in the task metadata. Any
    /// step failure moves the task to `CommitFailed`; nothing is retried or
    /// rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRegistryError::Domain`] for invalid input or a task not
    /// in `Succeeded`, [`TaskRegistryError::Commit`] when a step fails, and
    /// [`TaskRegistryError::Timeout`] when a remote call times out, in which
    /// case the stored task is left untouched.
    pub async fn commit_task(&self, request: CommitTaskRequest) -> TaskRegistryResult<Task> {
        let CommitTaskRequest {
            task_id,
            commit_message,
            pull_request_title,
            pull_request_body,
            branch_name,
            timeout,
        } = request;
        let branch = BranchName::new(branch_name)?;
        if commit_message.trim().is_empty() {
            return Err(TaskDomainError::EmptyCommitMessage.into());
        }
        if pull_request_title.trim().is_empty() {
            return Err(TaskDomainError::EmptyPullRequestTitle.into());
        }
        let remote_timeout = timeout.unwrap_or(self.settings.remote_timeout);

        let _guard = self.locks.acquire(task_id).await;
        let mut task = self.store.get(task_id).await?;
        ensure_transition(&task, TaskState::Committed)?;

        let outcome = self
            .run_commit_sequence(
                &mut task,
                &branch,
                &commit_message,
                &pull_request_title,
                &pull_request_body,
                remote_timeout,
            )
            .await;

        match outcome {
            Ok(pull_request) => {
                task.mark_committed(&pull_request, &*self.clock)?;
                self.persist_transition(&task, TaskState::Succeeded).await?;
                Ok(task)
            }
            Err(CommitAbort::TimedOut { step, after }) => Err(TaskRegistryError::Timeout {
                task_id,
                step,
                branch,
                after,
            }),
            Err(CommitAbort::Failed { step, reason }) => {
                let message = format!("{step} failed on branch {branch}: {reason}");
                task.record_metadata(metadata::COMMIT_FAILED_STEP, step.as_str());
                task.mark_commit_failed(
                    TaskFailure::new(FailureKind::Commit, message),
                    &*self.clock,
                )?;
                self.persist_transition(&task, TaskState::Succeeded).await?;
                self.events.emit(&TaskEvent::CommitFailed {
                    task_id,
                    step,
                    branch: branch.clone(),
                    reason: reason.to_string(),
                });
                Err(TaskRegistryError::Commit {
                    task_id,
                    step,
                    branch,
                    reason,
                })
            }
        }
    }

    async fn run_commit_sequence(
        &self,
        task: &mut Task,
        branch: &BranchName,
        commit_message: &str,
        pull_request_title: &str,
        pull_request_body: &str,
        timeout: Duration,
    ) -> Result<PullRequestRef, CommitAbort> {
        let files: Vec<FileChange> = self
            .environment
            .collect_changes(task)
            .await
            .map_err(|err| CommitAbort::Failed {
                step: CommitStep::CollectChanges,
                reason: err.into(),
            })?;

        remote_step(
            CommitStep::CreateBranch,
            timeout,
            self.repository
                .create_branch(&self.settings.base_branch, branch),
        )
        .await?;
        task.record_metadata(metadata::COMMIT_BRANCH, branch.as_str());

        let commit_id = remote_step(
            CommitStep::CommitChanges,
            timeout,
            self.repository
                .commit_changes(branch, &files, commit_message),
        )
        .await?;
        task.record_metadata(metadata::COMMIT_ID, commit_id);

        remote_step(
            CommitStep::OpenPullRequest,
            timeout,
            self.repository.open_pull_request(
                &self.settings.base_branch,
                branch,
                pull_request_title,
                pull_request_body,
            ),
        )
        .await
    }

    async fn persist_transition(&self, task: &Task, from: TaskState) -> TaskRegistryResult<()> {
        self.store.put(task).await?;
        self.events.emit(&TaskEvent::StateChanged {
            task_id: task.id(),
            from,
            to: task.state(),
        });
        Ok(())
    }
}

fn ensure_transition(task: &Task, target: TaskState) -> Result<(), TaskDomainError> {
    if task.state().can_transition_to(target) {
        return Ok(());
    }
    Err(TaskDomainError::InvalidStateTransition {
        task_id: task.id(),
        from: task.state(),
        to: target,
    })
}

async fn remote_step<T>(
    step: CommitStep,
    timeout: Duration,
    call: impl Future<Output = RemoteResult<T>>,
) -> Result<T, CommitAbort> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(CommitAbort::Failed {
            step,
            reason: err.into(),
        }),
        Err(_) => Err(CommitAbort::TimedOut {
            step,
            after: timeout,
        }),
    }
}
