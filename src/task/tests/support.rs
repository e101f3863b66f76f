//! Shared fixtures for task service tests.

use crate::agent::domain::{AgentConfig, InstructionPayload};
use crate::task::{
    adapters::memory::{
        InMemoryRepositoryManager, InMemoryTaskEnvironment, InMemoryTaskStore,
        RecordingTaskEventSink,
    },
    domain::{FileChange, TaskId},
    ports::RepositoryManager,
    services::{RunReport, TaskRegistry},
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(super) type MemoryRegistry = TaskRegistry<
    InMemoryTaskStore,
    InMemoryRepositoryManager,
    InMemoryTaskEnvironment,
    DefaultClock,
>;

/// Registry wired to in-memory adapters, with handles for inspection.
pub(super) struct Harness {
    pub(super) store: InMemoryTaskStore,
    pub(super) remote: InMemoryRepositoryManager,
    pub(super) environment: InMemoryTaskEnvironment,
    pub(super) events: RecordingTaskEventSink,
    pub(super) registry: Arc<MemoryRegistry>,
}

#[fixture]
pub(super) fn harness() -> Harness {
    let store = InMemoryTaskStore::new();
    let remote = InMemoryRepositoryManager::new();
    let environment = InMemoryTaskEnvironment::new();
    let events = RecordingTaskEventSink::new();
    let registry = TaskRegistry::new(
        Arc::new(store.clone()),
        Arc::new(remote.clone()),
        Arc::new(environment.clone()),
        Arc::new(DefaultClock),
    )
    .with_events(Arc::new(events.clone()));
    Harness {
        store,
        remote,
        environment,
        events,
        registry: Arc::new(registry),
    }
}

pub(super) fn config() -> AgentConfig {
    let instructions = InstructionPayload::builder("Add docs to {{ module }}")
        .variable("module", "scanner")
        .require("module")
        .build()
        .expect("valid instructions");
    AgentConfig::builder(instructions)
        .toolkit("python_writer")
        .build()
        .expect("valid config")
}

impl Harness {
    /// Creates a task and drives it to `Succeeded` with one staged change.
    pub(super) async fn succeeded_task(&self) -> TaskId {
        succeeded_task(&*self.registry, &self.environment).await
    }
}

/// Creates a task on any registry and drives it to `Succeeded`.
pub(super) async fn succeeded_task<M>(
    registry: &TaskRegistry<InMemoryTaskStore, M, InMemoryTaskEnvironment, DefaultClock>,
    environment: &InMemoryTaskEnvironment,
) -> TaskId
where
    M: RepositoryManager,
{
    let task_id = registry
        .create_task(&config())
        .await
        .expect("create task");
    registry
        .initialize_task(task_id)
        .await
        .expect("initialize task");
    let (_, run) = registry
        .begin_execution(task_id, CancellationToken::new())
        .await
        .expect("begin execution");
    registry
        .finish_execution(
            run,
            RunReport::Finished(Ok(json!({ "summary": "docs added" }))),
        )
        .await
        .expect("finish execution");
    environment
        .stage_changes(
            task_id,
            vec![FileChange::new("docs/scanner.md", "# Scanner").expect("valid change")],
        )
        .expect("stage changes");
    task_id
}
