//! Per-task exclusive locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::task::domain::TaskId;

type LockTable = HashMap<TaskId, Arc<AsyncMutex<()>>>;

/// Table of async mutexes keyed by task identifier.
///
/// Mutations of one task are serialized; different tasks never contend.
/// Entries are dropped once no holder or waiter remains.
#[derive(Debug, Default)]
pub(crate) struct TaskLocks {
    table: Arc<Mutex<LockTable>>,
}

/// Guard that holds a task's lock until dropped.
#[derive(Debug)]
pub(crate) struct TaskLockGuard {
    task_id: TaskId,
    table: Arc<Mutex<LockTable>>,
    _guard: OwnedMutexGuard<()>,
}

impl TaskLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the task.
    pub(crate) async fn acquire(&self, task_id: TaskId) -> TaskLockGuard {
        let lock = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(task_id).or_default())
        };
        let guard = lock.lock_owned().await;
        TaskLockGuard {
            task_id,
            table: Arc::clone(&self.table),
            _guard: guard,
        }
    }

    /// Returns how many tasks currently have a lock entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no task currently has a lock entry.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TaskLockGuard {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // The table and this guard hold one reference each; any more means a waiter.
        let idle = table
            .get(&self.task_id)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2);
        if idle {
            table.remove(&self.task_id);
        }
    }
}
