//! Cancellation tokens of runs that are currently live.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::task::domain::TaskId;

/// Failure message recorded when a caller cancels a live run.
pub(crate) const CANCELLED_BY_CALLER: &str = "cancelled by caller";

type RunTable = HashMap<TaskId, CancellationToken>;

/// Live runs keyed by task, shared by every executor of one registry.
#[derive(Debug, Default)]
pub(crate) struct ActiveRuns {
    table: Arc<Mutex<RunTable>>,
}

/// Registration of one live run; dropping it removes the token.
#[derive(Debug)]
pub(crate) struct ActiveRun {
    task_id: TaskId,
    token: CancellationToken,
    table: Arc<Mutex<RunTable>>,
}

impl ActiveRuns {
    pub(crate) fn register(&self, task_id: TaskId, token: CancellationToken) -> ActiveRun {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task_id, token.clone());
        ActiveRun {
            task_id,
            token,
            table: Arc::clone(&self.table),
        }
    }

    /// Cancels the task's live run, returning whether one was registered.
    pub(crate) fn signal(&self, task_id: TaskId) -> bool {
        let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.get(&task_id).is_some_and(|token| {
            tracing::info!(task_id = %task_id, "signalling cancellation to running task");
            token.cancel();
            true
        })
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, task_id: TaskId) -> bool {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&task_id)
    }
}

impl ActiveRun {
    pub(crate) const fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.task_id);
    }
}
