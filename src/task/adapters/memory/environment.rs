//! In-memory working environment with scripted outcomes.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{FileChange, Task, TaskId},
    ports::{EnvironmentError, EnvironmentResult, TaskEnvironment},
};

/// Working environment that tracks prepared tasks in memory.
///
/// Preparation failures are queued and consumed one per `prepare` call.
/// Changes are staged per task, falling back to a shared default set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskEnvironment {
    state: Arc<RwLock<EnvironmentState>>,
}

#[derive(Debug, Default)]
struct EnvironmentState {
    prepared: HashSet<TaskId>,
    prepare_calls: usize,
    pending_failures: VecDeque<String>,
    staged: HashMap<TaskId, Vec<FileChange>>,
    default_changes: Vec<FileChange>,
}

fn lock_error(err: impl std::fmt::Display) -> EnvironmentError {
    EnvironmentError::io(std::io::Error::other(err.to_string()))
}

impl InMemoryTaskEnvironment {
    /// Creates an environment that prepares every task successfully.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `prepare` call fail with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Io`] if the internal lock is poisoned.
    pub fn fail_next_prepare(&self, reason: impl Into<String>) -> EnvironmentResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.pending_failures.push_back(reason.into());
        Ok(())
    }

    /// Stages the changes reported for one task.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Io`] if the internal lock is poisoned.
    pub fn stage_changes(&self, task_id: TaskId, files: Vec<FileChange>) -> EnvironmentResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.staged.insert(task_id, files);
        Ok(())
    }

    /// Sets the changes reported for tasks without staged changes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Io`] if the internal lock is poisoned.
    pub fn set_default_changes(&self, files: Vec<FileChange>) -> EnvironmentResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.default_changes = files;
        Ok(())
    }

    /// Returns whether the task's workspace has been prepared.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Io`] if the internal lock is poisoned.
    pub fn is_prepared(&self, task_id: TaskId) -> EnvironmentResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.prepared.contains(&task_id))
    }

    /// Returns how many times `prepare` has been called.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError::Io`] if the internal lock is poisoned.
    pub fn prepare_calls(&self) -> EnvironmentResult<usize> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.prepare_calls)
    }
}

#[async_trait]
impl TaskEnvironment for InMemoryTaskEnvironment {
    async fn prepare(&self, task: &Task) -> EnvironmentResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.prepare_calls += 1;
        if let Some(reason) = state.pending_failures.pop_front() {
            return Err(EnvironmentError::Preparation(reason));
        }
        state.prepared.insert(task.id());
        Ok(())
    }

    async fn collect_changes(&self, task: &Task) -> EnvironmentResult<Vec<FileChange>> {
        let state = self.state.read().map_err(lock_error)?;
        if !state.prepared.contains(&task.id()) {
            return Err(EnvironmentError::MissingWorkspace);
        }
        Ok(state
            .staged
            .get(&task.id())
            .unwrap_or(&state.default_changes)
            .clone())
    }
}
