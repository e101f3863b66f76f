//! Task aggregate root and related task lifecycle types.

use super::{ParseTaskStateError, PullRequestRef, TaskDomainError, TaskId, metadata};
use crate::agent::domain::InstructionPayload;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task has been created but its working environment is not prepared.
    Created,
    /// Working environment is prepared; the task is ready to execute.
    Initialized,
    /// An execution strategy is running the task.
    Running,
    /// Execution finished and produced a result.
    Succeeded,
    /// Initialization or execution failed; the task may be re-initialized.
    Failed,
    /// Changes were committed and a pull request opened.
    Committed,
    /// The commit sequence failed, possibly after partial remote progress.
    CommitFailed,
}

impl TaskState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Committed => "committed",
            Self::CommitFailed => "commit_failed",
        }
    }

    /// Returns whether the lifecycle permits moving to `target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Created | Self::Failed, Self::Initialized)
                | (Self::Created | Self::Running, Self::Failed)
                | (Self::Initialized, Self::Running)
                | (Self::Running, Self::Succeeded)
                | (Self::Succeeded, Self::Committed | Self::CommitFailed)
        )
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::CommitFailed)
    }

    /// Returns whether tasks in this state carry an error record.
    #[must_use]
    pub const fn carries_error(self) -> bool {
        matches!(self, Self::Failed | Self::CommitFailed)
    }

    /// Returns whether tasks in this state carry a result.
    #[must_use]
    pub const fn carries_result(self) -> bool {
        matches!(self, Self::Succeeded | Self::Committed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "created" => Ok(Self::Created),
            "initialized" => Ok(Self::Initialized),
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "committed" => Ok(Self::Committed),
            "commit_failed" => Ok(Self::CommitFailed),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Category of a recorded task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The working environment could not be prepared.
    Environment,
    /// The execution strategy reported an error.
    Execution,
    /// The run was cancelled.
    Cancelled,
    /// The commit sequence failed.
    Commit,
}

impl FailureKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Execution => "execution",
            Self::Cancelled => "cancelled",
            Self::Commit => "commit",
        }
    }
}

/// Failure recorded on a task in `Failed` or `CommitFailed` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    kind: FailureKind,
    message: String,
}

impl TaskFailure {
    /// Creates a failure record.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

/// Task aggregate root.
///
/// State only changes through the `mark_*` methods, each of which validates
/// the lifecycle edge before touching any field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    state: TaskState,
    instructions: InstructionPayload,
    metadata: BTreeMap<String, String>,
    result: Option<Value>,
    error: Option<TaskFailure>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted instruction payload.
    pub instructions: InstructionPayload,
    /// Persisted metadata.
    pub metadata: BTreeMap<String, String>,
    /// Persisted result, if any.
    pub result: Option<Value>,
    /// Persisted failure, if any.
    pub error: Option<TaskFailure>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the `Created` state.
    #[must_use]
    pub fn new(
        instructions: InstructionPayload,
        metadata: BTreeMap<String, String>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            state: TaskState::Created,
            instructions,
            metadata,
            result: None,
            error: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            state: data.state,
            instructions: data.instructions,
            metadata: data.metadata,
            result: data.result,
            error: data.error,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the instruction payload.
    #[must_use]
    pub const fn instructions(&self) -> &InstructionPayload {
        &self.instructions
    }

    /// Returns the task metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Returns a single metadata value, if present.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Returns the execution result, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Returns the recorded failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&TaskFailure> {
        self.error.as_ref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks the working environment as prepared.
    ///
    /// Valid from `Created` and, as an explicit retry, from `Failed`. Any
    /// previous failure is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] from other states.
    pub fn mark_initialized(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Initialized, clock)?;
        self.error = None;
        Ok(())
    }

    /// Marks execution as started.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// `Initialized`.
    pub fn mark_running(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Running, clock)
    }

    /// Records a successful execution result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// `Running`.
    pub fn mark_succeeded(
        &mut self,
        result: Value,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Succeeded, clock)?;
        self.result = Some(result);
        Ok(())
    }

    /// Records an initialization or execution failure.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// `Created` or `Running`.
    pub fn mark_failed(
        &mut self,
        failure: TaskFailure,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Failed, clock)?;
        self.result = None;
        self.error = Some(failure);
        Ok(())
    }

    /// Records a completed commit and its pull request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// `Succeeded`.
    pub fn mark_committed(
        &mut self,
        pull_request: &PullRequestRef,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::Committed, clock)?;
        self.metadata.insert(
            metadata::PULL_REQUEST_NUMBER.to_owned(),
            pull_request.number().to_string(),
        );
        self.metadata
            .insert(metadata::PULL_REQUEST_URL.to_owned(), pull_request.url().to_owned());
        Ok(())
    }

    /// Records a failed commit sequence.
    ///
    /// Commit bookkeeping already written to the metadata is kept so the
    /// remote sequence can be resumed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// `Succeeded`.
    pub fn mark_commit_failed(
        &mut self,
        failure: TaskFailure,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.transition_to(TaskState::CommitFailed, clock)?;
        self.result = None;
        self.error = Some(failure);
        Ok(())
    }

    /// Replaces the failure of a task that stays `Failed`.
    ///
    /// Used when a retried preparation fails again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] unless the task is
    /// `Failed`.
    pub fn replace_failure(
        &mut self,
        failure: TaskFailure,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.state != TaskState::Failed {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.state,
                to: TaskState::Failed,
            });
        }
        self.error = Some(failure);
        self.touch(clock);
        Ok(())
    }

    /// Writes a bookkeeping metadata entry.
    pub(crate) fn record_metadata(&mut self, key: &str, value: impl Into<String>) {
        self.metadata.insert(key.to_owned(), value.into());
    }

    fn transition_to(
        &mut self,
        target: TaskState,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.state.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        self.touch(clock);
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
