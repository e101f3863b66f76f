//! Task store contract tests against a real `PostgreSQL` database.

use super::helpers::{TaskDatabase, new_task, test_runtime};
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use serde_json::json;
use taskpilot::task::{
    domain::{FailureKind, TaskFailure, TaskId, TaskState},
    ports::{TaskStore, TaskStoreError},
};

#[rstest]
fn put_twice_leaves_one_identical_record(shared_test_cluster: &'static TestCluster) {
    let database = TaskDatabase::create(shared_test_cluster).expect("database setup");
    let task = new_task("document the scanner");
    let rt = test_runtime();

    rt.block_on(database.store().put(&task)).expect("first put");
    rt.block_on(database.store().put(&task)).expect("repeated put");

    let snapshot = rt.block_on(database.store().list_all()).expect("list");
    assert_eq!(snapshot.len(), 1);
    let stored = rt.block_on(database.store().get(task.id())).expect("get");
    assert_eq!(stored.id(), task.id());
    assert_eq!(stored.state(), TaskState::Created);
    assert_eq!(stored.instructions(), task.instructions());
    assert_eq!(stored.metadata(), task.metadata());
}

#[rstest]
fn overwrite_keeps_first_put_order(shared_test_cluster: &'static TestCluster) {
    let database = TaskDatabase::create(shared_test_cluster).expect("database setup");
    let mut first = new_task("first");
    let second = new_task("second");
    let rt = test_runtime();
    rt.block_on(database.store().put(&first)).expect("put first");
    rt.block_on(database.store().put(&second)).expect("put second");

    first.mark_initialized(&DefaultClock).expect("initialize");
    rt.block_on(database.store().put(&first)).expect("overwrite first");

    let snapshot = rt.block_on(database.store().list_all()).expect("list");
    let listed: Vec<(TaskId, TaskState)> = snapshot
        .iter()
        .map(|task| (task.id(), task.state()))
        .collect();
    assert_eq!(
        listed,
        vec![
            (first.id(), TaskState::Initialized),
            (second.id(), TaskState::Created),
        ]
    );
}

#[rstest]
fn get_reports_missing_task(shared_test_cluster: &'static TestCluster) {
    let database = TaskDatabase::create(shared_test_cluster).expect("database setup");
    let missing = TaskId::new();

    let result = test_runtime().block_on(database.store().get(missing));

    assert!(matches!(result, Err(TaskStoreError::NotFound(id)) if id == missing));
}

#[rstest]
fn recorded_outcomes_survive_storage(shared_test_cluster: &'static TestCluster) {
    let database = TaskDatabase::create(shared_test_cluster).expect("database setup");
    let clock = DefaultClock;
    let mut succeeded = new_task("summarise");
    succeeded.mark_initialized(&clock).expect("initialize");
    succeeded.mark_running(&clock).expect("run");
    succeeded
        .mark_succeeded(json!({"summary": "docs added"}), &clock)
        .expect("succeed");
    let mut failed = new_task("refactor");
    failed.mark_initialized(&clock).expect("initialize");
    failed.mark_running(&clock).expect("run");
    failed
        .mark_failed(TaskFailure::new(FailureKind::Execution, "model refused"), &clock)
        .expect("fail");
    let rt = test_runtime();
    rt.block_on(database.store().put(&succeeded)).expect("put succeeded");
    rt.block_on(database.store().put(&failed)).expect("put failed");

    let stored_success = rt.block_on(database.store().get(succeeded.id())).expect("get");
    let stored_failure = rt.block_on(database.store().get(failed.id())).expect("get");

    assert_eq!(stored_success.state(), TaskState::Succeeded);
    assert_eq!(stored_success.result(), Some(&json!({"summary": "docs added"})));
    assert!(stored_success.error().is_none());
    assert_eq!(stored_failure.state(), TaskState::Failed);
    assert!(stored_failure.result().is_none());
    assert_eq!(stored_failure.error(), failed.error());
}

#[rstest]
fn schema_rejects_unknown_states(shared_test_cluster: &'static TestCluster) {
    let database = TaskDatabase::create(shared_test_cluster).expect("database setup");
    let mut conn = database.connect().expect("connect");

    let result = diesel::sql_query(concat!(
        "INSERT INTO tasks (id, state, instructions, created_at, updated_at) ",
        "VALUES ($1, 'paused', '{\"text\": \"x\"}', NOW(), NOW())",
    ))
    .bind::<diesel::sql_types::Uuid, _>(TaskId::new().into_inner())
    .execute(&mut conn);

    assert!(
        matches!(
            result,
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::CheckViolation,
                _
            ))
        ),
        "expected check violation, got: {result:?}"
    );
}
