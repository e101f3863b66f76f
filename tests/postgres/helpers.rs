//! Shared helpers for `PostgreSQL` task store tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use std::collections::BTreeMap;
use taskpilot::{
    agent::domain::InstructionPayload,
    task::{
        adapters::postgres::PostgresTaskStore,
        domain::{Task, metadata},
    },
};
use tokio::runtime::Runtime;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL creating the `tasks` table.
pub const CREATE_TASKS_SQL: &str =
    include_str!("../../migrations/2026-01-12-000000_create_tasks/up.sql");

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "taskpilot_test_template";

/// Creates a tokio runtime for driving the async store from sync tests.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
#[must_use]
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the tasks schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_TASKS_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Temporary database holding a migrated `tasks` table.
///
/// The database is dropped with the guard, including when a test panics.
pub struct TaskDatabase {
    cluster: &'static TestCluster,
    name: String,
    store: PostgresTaskStore,
}

impl TaskDatabase {
    /// Clones the template into a fresh database and opens a store on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the template, database, or pool cannot be created.
    pub fn create(cluster: &'static TestCluster) -> Result<Self, BoxError> {
        ensure_template(cluster)?;
        let name = format!("test_tasks_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| Box::new(e) as BoxError)?;
        let url = cluster.connection().database_url(&name);
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| Box::new(e) as BoxError)?;
        Ok(Self {
            cluster,
            name,
            store: PostgresTaskStore::new(pool),
        })
    }

    /// Returns the store bound to this database.
    #[must_use]
    pub const fn store(&self) -> &PostgresTaskStore {
        &self.store
    }

    /// Opens a direct connection for raw SQL checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn connect(&self) -> Result<PgConnection, BoxError> {
        let url = self.cluster.connection().database_url(&self.name);
        PgConnection::establish(&url).map_err(|e| Box::new(e) as BoxError)
    }
}

impl Drop for TaskDatabase {
    #[expect(
        clippy::print_stderr,
        reason = "Test cleanup warnings are informational"
    )]
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.name);
        }
    }
}

/// Builds a new task whose instructions are `text`.
///
/// # Panics
///
/// Panics if `text` is empty.
#[must_use]
pub fn new_task(text: &str) -> Task {
    let instructions = InstructionPayload::builder(text)
        .build()
        .expect("valid instructions");
    let metadata = BTreeMap::from([(metadata::SESSION_ID.to_owned(), "session-7".to_owned())]);
    Task::new(instructions, metadata, &DefaultClock)
}
