//! Then steps for task lifecycle BDD scenarios.

use super::world::LifecycleWorld;
use rstest_bdd_macros::then;
use serde_json::json;
use taskpilot::task::{domain::metadata, services::TaskRegistryError};

#[then(r#"the task state is "{state}""#)]
fn task_state_is(world: &LifecycleWorld, state: String) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    if task.state().as_str() != state {
        return Err(eyre::eyre!(
            "expected state {state}, found {}",
            task.state().as_str()
        ));
    }
    Ok(())
}

#[then("the task result is true")]
fn task_result_is_true(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    if task.result() != Some(&json!(true)) {
        return Err(eyre::eyre!("expected result true, found {:?}", task.result()));
    }
    Ok(())
}

#[then(r#"the task error mentions "{fragment}""#)]
fn task_error_mentions(world: &LifecycleWorld, fragment: String) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    let failure = task
        .error()
        .ok_or_else(|| eyre::eyre!("expected the task to record an error"))?;
    if !failure.message().contains(&fragment) {
        return Err(eyre::eyre!(
            "expected error to mention {fragment}, found {}",
            failure.message()
        ));
    }
    Ok(())
}

#[then(r#"the task metadata records branch "{branch}""#)]
fn metadata_records_branch(world: &LifecycleWorld, branch: String) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    let recorded = task.metadata_value(metadata::COMMIT_BRANCH);
    if recorded != Some(branch.as_str()) {
        return Err(eyre::eyre!("expected branch {branch}, found {recorded:?}"));
    }
    Ok(())
}

#[then("the lookup fails with a not found error")]
fn lookup_fails_not_found(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let lookup = world
        .last_lookup
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing lookup result in scenario world"))?;
    if !matches!(lookup, Err(TaskRegistryError::NotFound(_))) {
        return Err(eyre::eyre!("expected NotFound, got {lookup:?}"));
    }
    Ok(())
}
