//! Shared wiring for in-memory integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskpilot::{
    agent::domain::{AgentConfig, InstructionPayload},
    task::{
        adapters::{
            execution::StaticResultStrategy,
            memory::{
                InMemoryRepositoryManager, InMemoryTaskEnvironment, InMemoryTaskStore,
                RecordingTaskEventSink,
            },
        },
        services::{TaskExecutor, TaskRegistry},
    },
};

/// Registry wired to in-memory adapters.
pub type TestRegistry = TaskRegistry<
    InMemoryTaskStore,
    InMemoryRepositoryManager,
    InMemoryTaskEnvironment,
    DefaultClock,
>;

/// Executor driving [`TestRegistry`] with a static strategy.
pub type TestExecutor = TaskExecutor<
    StaticResultStrategy,
    InMemoryTaskStore,
    InMemoryRepositoryManager,
    InMemoryTaskEnvironment,
    DefaultClock,
>;

/// In-memory system under test with handles for inspection.
pub struct System {
    pub remote: InMemoryRepositoryManager,
    pub environment: InMemoryTaskEnvironment,
    pub events: RecordingTaskEventSink,
    pub registry: Arc<TestRegistry>,
}

impl System {
    /// Builds an executor that reports `strategy`'s outcome.
    #[must_use]
    pub fn executor(&self, strategy: StaticResultStrategy) -> TestExecutor {
        TaskExecutor::new(Arc::clone(&self.registry), Arc::new(strategy))
    }
}

/// Fixture wiring a fresh registry with recording adapters.
#[fixture]
pub fn system() -> System {
    let remote = InMemoryRepositoryManager::new();
    let environment = InMemoryTaskEnvironment::new();
    let events = RecordingTaskEventSink::new();
    let registry = TaskRegistry::new(
        Arc::new(InMemoryTaskStore::new()),
        Arc::new(remote.clone()),
        Arc::new(environment.clone()),
        Arc::new(DefaultClock),
    )
    .with_events(Arc::new(events.clone()));
    System {
        remote,
        environment,
        events,
        registry: Arc::new(registry),
    }
}

/// Builds an agent configuration whose instructions are `text`.
///
/// # Panics
///
/// Panics if `text` is empty.
#[must_use]
pub fn agent_config(text: &str) -> AgentConfig {
    let instructions = InstructionPayload::builder(text)
        .build()
        .expect("valid instructions");
    AgentConfig::builder(instructions)
        .toolkit_list("python_writer,codebase_oracle")
        .session_id("session-7")
        .build()
        .expect("valid agent config")
}
