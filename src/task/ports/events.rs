//! Port for structured task lifecycle events.

use crate::task::domain::{BranchName, CommitStep, TaskId, TaskState};

/// Lifecycle event emitted by the registry and executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// A task was created and persisted.
    Created {
        /// Task identifier.
        task_id: TaskId,
    },
    /// A task moved between lifecycle states.
    StateChanged {
        /// Task identifier.
        task_id: TaskId,
        /// Previous state.
        from: TaskState,
        /// New state.
        to: TaskState,
    },
    /// A commit sequence failed.
    CommitFailed {
        /// Task identifier.
        task_id: TaskId,
        /// Sub-step that failed.
        step: CommitStep,
        /// Branch the commit targeted.
        branch: BranchName,
        /// Failure description.
        reason: String,
    },
}

impl TaskEvent {
    /// Returns the event name used in structured logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "task_created",
            Self::StateChanged { .. } => "task_state_changed",
            Self::CommitFailed { .. } => "commit_failed",
        }
    }

    /// Returns the task the event concerns.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Created { task_id }
            | Self::StateChanged { task_id, .. }
            | Self::CommitFailed { task_id, .. } => *task_id,
        }
    }
}

/// Receiver for task lifecycle events.
///
/// Sinks must not block; the registry emits events while holding the
/// task's lock.
pub trait TaskEventSink: Send + Sync {
    /// Records one event.
    fn emit(&self, event: &TaskEvent);
}
