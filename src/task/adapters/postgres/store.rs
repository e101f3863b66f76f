//! `PostgreSQL` task store.

use super::{
    models::{NewTaskRow, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{PersistedTaskData, Task, TaskFailure, TaskId, TaskState},
    ports::{TaskSnapshot, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::upsert::excluded;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task store.
///
/// `put` upserts on the task identifier, so a retried write of the same
/// record is harmless.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn put(&self, task: &Task) -> TaskStoreResult<()> {
        let row = to_new_row(task)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .on_conflict(tasks::id)
                .do_update()
                .set((
                    tasks::state.eq(excluded(tasks::state)),
                    tasks::instructions.eq(excluded(tasks::instructions)),
                    tasks::metadata.eq(excluded(tasks::metadata)),
                    tasks::result.eq(excluded(tasks::result)),
                    tasks::error.eq(excluded(tasks::error)),
                    tasks::updated_at.eq(excluded(tasks::updated_at)),
                ))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: TaskId) -> TaskStoreResult<Task> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            row.map_or(Err(TaskStoreError::NotFound(id)), row_to_task)
        })
        .await
    }

    async fn list_all(&self) -> TaskStoreResult<TaskSnapshot> {
        self.run_blocking(|connection| {
            let rows = tasks::table
                .order(tasks::seq.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            let tasks = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskStoreResult<Vec<_>>>()?;
            Ok(TaskSnapshot::new(tasks))
        })
        .await
    }
}

pub(super) fn to_new_row(task: &Task) -> TaskStoreResult<NewTaskRow> {
    let instructions =
        serde_json::to_value(task.instructions()).map_err(TaskStoreError::persistence)?;
    let metadata = serde_json::to_value(task.metadata()).map_err(TaskStoreError::persistence)?;
    let error = task
        .error()
        .map(serde_json::to_value)
        .transpose()
        .map_err(TaskStoreError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        state: task.state().as_str().to_owned(),
        instructions,
        metadata,
        result: task.result().cloned(),
        error,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow) -> TaskStoreResult<Task> {
    let TaskRow {
        id,
        state: persisted_state,
        instructions: persisted_instructions,
        metadata: persisted_metadata,
        result,
        error: persisted_error,
        created_at,
        updated_at,
    } = row;

    let state =
        TaskState::try_from(persisted_state.as_str()).map_err(TaskStoreError::persistence)?;
    let instructions =
        serde_json::from_value(persisted_instructions).map_err(TaskStoreError::persistence)?;
    let metadata =
        serde_json::from_value(persisted_metadata).map_err(TaskStoreError::persistence)?;
    let error = persisted_error
        .map(serde_json::from_value::<TaskFailure>)
        .transpose()
        .map_err(TaskStoreError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        state,
        instructions,
        metadata,
        result,
        error,
        created_at,
        updated_at,
    }))
}
