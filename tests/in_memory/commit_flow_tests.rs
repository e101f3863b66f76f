//! In-memory integration tests for publishing task changes.

use super::helpers::{System, agent_config, system};
use rstest::rstest;
use serde_json::json;
use taskpilot::task::{
    adapters::execution::StaticResultStrategy,
    domain::{BranchName, CommitStep, FailureKind, FileChange, TaskId, TaskState, metadata},
    ports::RemoteError,
    services::{CommitTaskRequest, TaskRegistryError},
};

async fn succeeded_task(system: &System) -> TaskId {
    let task_id = system
        .registry
        .create_task(&agent_config("Document the scanner module"))
        .await
        .expect("create task");
    system
        .registry
        .initialize_task(task_id)
        .await
        .expect("initialize task");
    system
        .executor(StaticResultStrategy::succeeding(json!({ "files": 1 })))
        .execute_task(task_id)
        .await
        .expect("execute task");
    system
        .environment
        .stage_changes(
            task_id,
            vec![FileChange::new("docs/scanner.md", "# Scanner\n").expect("valid change")],
        )
        .expect("stage changes");
    task_id
}

fn request(task_id: TaskId) -> CommitTaskRequest {
    CommitTaskRequest::new(
        task_id,
        "Document the scanner module",
        "Scanner documentation",
        "Adds a module overview for the scanner.",
        "docs/scanner",
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn succeeded_task_is_published_as_pull_request(system: System) {
    let task_id = succeeded_task(&system).await;

    let committed = system
        .registry
        .commit_task(request(task_id))
        .await
        .expect("commit task");

    assert_eq!(committed.state(), TaskState::Committed);
    assert_eq!(committed.result(), Some(&json!({ "files": 1 })));
    assert_eq!(
        committed.metadata_value(metadata::COMMIT_BRANCH),
        Some("docs/scanner")
    );
    assert_eq!(
        committed.metadata_value(metadata::PULL_REQUEST_NUMBER),
        Some("1")
    );
    let branch = BranchName::new("docs/scanner").expect("valid branch");
    let commits = system.remote.commits().expect("inspect commits");
    assert_eq!(commits.len(), 1);
    assert!(
        system
            .remote
            .pull_request_for(&branch)
            .expect("inspect pull requests")
            .is_some()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pull_request_failure_keeps_branch_progress(system: System) {
    let task_id = succeeded_task(&system).await;
    system
        .remote
        .fail_on(
            CommitStep::OpenPullRequest,
            RemoteError::Network("connection reset".to_owned()),
        )
        .expect("script failure");

    let result = system.registry.commit_task(request(task_id)).await;

    assert!(matches!(
        result,
        Err(TaskRegistryError::Commit {
            step: CommitStep::OpenPullRequest,
            ..
        })
    ));
    let task = system.registry.get_task(task_id).await.expect("get task");
    assert_eq!(task.state(), TaskState::CommitFailed);
    assert!(task.result().is_none());
    let failure = task.error().expect("failure recorded");
    assert_eq!(failure.kind(), FailureKind::Commit);
    assert!(failure.message().contains("open_pull_request"));
    assert_eq!(
        task.metadata_value(metadata::COMMIT_BRANCH),
        Some("docs/scanner")
    );
    assert!(task.metadata_value(metadata::COMMIT_ID).is_some());
    assert_eq!(
        system.remote.calls().expect("inspect calls"),
        vec![
            CommitStep::CreateBranch,
            CommitStep::CommitChanges,
            CommitStep::OpenPullRequest,
        ]
    );
    assert_eq!(
        system.events.event_names().last().copied(),
        Some("commit_failed")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_is_refused_before_execution_finishes(system: System) {
    let task_id = system
        .registry
        .create_task(&agent_config("Document the scanner module"))
        .await
        .expect("create task");

    let result = system.registry.commit_task(request(task_id)).await;

    assert!(matches!(result, Err(TaskRegistryError::Domain(_))));
    assert!(system.remote.calls().expect("inspect calls").is_empty());
    let task = system.registry.get_task(task_id).await.expect("get task");
    assert_eq!(task.state(), TaskState::Created);
}
