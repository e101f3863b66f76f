//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskpilot::task::{
    adapters::{
        execution::StaticResultStrategy,
        memory::{InMemoryRepositoryManager, InMemoryTaskEnvironment, InMemoryTaskStore},
    },
    domain::{Task, TaskId},
    services::{TaskExecutor, TaskRegistry, TaskRegistryError},
};

/// Registry type used by the BDD world.
pub type TestRegistry = TaskRegistry<
    InMemoryTaskStore,
    InMemoryRepositoryManager,
    InMemoryTaskEnvironment,
    DefaultClock,
>;

/// Executor type used by the BDD world.
pub type TestExecutor = TaskExecutor<
    StaticResultStrategy,
    InMemoryTaskStore,
    InMemoryRepositoryManager,
    InMemoryTaskEnvironment,
    DefaultClock,
>;

/// Scenario world for task lifecycle behaviour tests.
pub struct LifecycleWorld {
    pub registry: Arc<TestRegistry>,
    pub remote: InMemoryRepositoryManager,
    pub environment: InMemoryTaskEnvironment,
    pub task_id: Option<TaskId>,
    pub last_lookup: Option<Result<Task, TaskRegistryError>>,
}

impl LifecycleWorld {
    /// Creates a world wired to fresh in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        let remote = InMemoryRepositoryManager::new();
        let environment = InMemoryTaskEnvironment::new();
        let registry = TaskRegistry::new(
            Arc::new(InMemoryTaskStore::new()),
            Arc::new(remote.clone()),
            Arc::new(environment.clone()),
            Arc::new(DefaultClock),
        );
        Self {
            registry: Arc::new(registry),
            remote,
            environment,
            task_id: None,
            last_lookup: None,
        }
    }

    /// Returns the task the scenario is driving.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task_id(&self) -> Result<TaskId, eyre::Report> {
        self.task_id
            .ok_or_else(|| eyre::eyre!("no task created in scenario world"))
    }

    /// Builds an executor whose strategy reports `strategy`'s outcome.
    #[must_use]
    pub fn executor(&self, strategy: StaticResultStrategy) -> TestExecutor {
        TaskExecutor::new(Arc::clone(&self.registry), Arc::new(strategy))
    }

    /// Reads the current task record.
    ///
    /// # Errors
    ///
    /// Returns an error when no task exists or the registry lookup fails.
    pub fn current_task(&self) -> Result<Task, eyre::Report> {
        let task_id = self.task_id()?;
        Ok(run_async(self.registry.get_task(task_id))?)
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
