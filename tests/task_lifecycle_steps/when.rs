//! When steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use rstest_bdd_macros::when;
use serde_json::json;
use taskpilot::task::{
    adapters::execution::StaticResultStrategy, domain::TaskId, services::CommitTaskRequest,
};

#[when("the task is executed by a strategy returning true")]
fn execute_returning_true(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let executor = world.executor(StaticResultStrategy::succeeding(json!(true)));
    run_async(executor.execute_task(task_id))?;
    Ok(())
}

#[when(r#"the task is committed to branch "{branch}""#)]
fn commit_to_branch(world: &mut LifecycleWorld, branch: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let request = CommitTaskRequest::new(
        task_id,
        "Document the scanner",
        "Scanner docs",
        "Adds scanner documentation.",
        branch,
    );
    if run_async(world.registry.commit_task(request)).is_ok() {
        return Err(eyre::eyre!("expected the commit sequence to fail"));
    }
    Ok(())
}

#[when("the task is initialized again")]
fn initialize_again(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    run_async(world.registry.initialize_task(task_id))?;
    Ok(())
}

#[when("an unknown task is requested")]
fn request_unknown_task(world: &mut LifecycleWorld) {
    world.last_lookup = Some(run_async(world.registry.get_task(TaskId::new())));
}
