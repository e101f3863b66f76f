//! In-memory integration tests for task creation and execution.

use super::helpers::{System, agent_config, system};
use rstest::rstest;
use serde_json::json;
use taskpilot::task::{
    adapters::execution::StaticResultStrategy,
    domain::{FailureKind, TaskId, TaskState, metadata},
    services::{TaskExecutorError, TaskRegistryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_runs_from_creation_to_success(system: System) {
    let task_id = system
        .registry
        .create_task(&agent_config("return True"))
        .await
        .expect("create task");
    let initialized = system
        .registry
        .initialize_task(task_id)
        .await
        .expect("initialize task");
    assert_eq!(initialized.state(), TaskState::Initialized);

    let finished = system
        .executor(StaticResultStrategy::succeeding(json!(true)))
        .execute_task(task_id)
        .await
        .expect("execute task");

    assert_eq!(finished.state(), TaskState::Succeeded);
    assert_eq!(finished.result(), Some(&json!(true)));
    assert_eq!(finished.instructions().text(), "return True");
    assert_eq!(
        finished.metadata_value(metadata::TOOLKITS),
        Some("python_writer,codebase_oracle")
    );
    assert_eq!(finished.metadata_value(metadata::SESSION_ID), Some("session-7"));
    assert!(system.environment.is_prepared(task_id).expect("inspect environment"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_is_not_found(system: System) {
    let missing = TaskId::new();

    let result = system.registry.get_task(missing).await;

    assert!(matches!(result, Err(TaskRegistryError::NotFound(id)) if id == missing));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_task_recovers_through_reinitialization(system: System) {
    let task_id = system
        .registry
        .create_task(&agent_config("return True"))
        .await
        .expect("create task");
    system
        .registry
        .initialize_task(task_id)
        .await
        .expect("initialize task");
    let failure = system
        .executor(StaticResultStrategy::failing("interpreter crashed"))
        .execute_task(task_id)
        .await;
    assert!(matches!(failure, Err(TaskExecutorError::Execution { .. })));
    let failed = system.registry.get_task(task_id).await.expect("get task");
    assert_eq!(
        failed.error().map(|err| err.kind()),
        Some(FailureKind::Execution)
    );

    let retried = system
        .registry
        .initialize_task(task_id)
        .await
        .expect("retry initialization");
    assert_eq!(retried.state(), TaskState::Initialized);
    assert!(retried.error().is_none());

    let finished = system
        .executor(StaticResultStrategy::succeeding(json!(true)))
        .execute_task(task_id)
        .await
        .expect("execute retried task");
    assert_eq!(finished.state(), TaskState::Succeeded);
    assert_eq!(system.environment.prepare_calls().expect("inspect environment"), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_reflects_every_task_in_creation_order(system: System) {
    let first = system
        .registry
        .create_task(&agent_config("first"))
        .await
        .expect("create first task");
    let second = system
        .registry
        .create_task(&agent_config("second"))
        .await
        .expect("create second task");
    let third = system
        .registry
        .create_task(&agent_config("third"))
        .await
        .expect("create third task");
    system
        .registry
        .initialize_task(second)
        .await
        .expect("initialize task");

    let snapshot = system.registry.list_tasks().await.expect("list tasks");

    let listed: Vec<(TaskId, TaskState)> = snapshot
        .iter()
        .map(|task| (task.id(), task.state()))
        .collect();
    assert_eq!(
        listed,
        vec![
            (first, TaskState::Created),
            (second, TaskState::Initialized),
            (third, TaskState::Created),
        ]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_events_follow_each_transition(system: System) {
    let task_id = system
        .registry
        .create_task(&agent_config("return True"))
        .await
        .expect("create task");
    system
        .registry
        .initialize_task(task_id)
        .await
        .expect("initialize task");
    system
        .executor(StaticResultStrategy::succeeding(json!(true)))
        .execute_task(task_id)
        .await
        .expect("execute task");

    assert_eq!(
        system.events.event_names(),
        vec![
            "task_created",
            "task_state_changed",
            "task_state_changed",
            "task_state_changed",
        ]
    );
}
