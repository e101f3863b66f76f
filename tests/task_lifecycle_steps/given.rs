//! Given steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;
use taskpilot::{
    agent::domain::{AgentConfig, InstructionPayload},
    task::{
        adapters::execution::StaticResultStrategy,
        domain::{CommitStep, FileChange},
        ports::RemoteError,
    },
};

fn create_task(world: &mut LifecycleWorld, text: &str) -> Result<(), eyre::Report> {
    let instructions = InstructionPayload::builder(text)
        .build()
        .wrap_err("build instruction payload")?;
    let config = AgentConfig::builder(instructions)
        .toolkit("python_writer")
        .build()
        .wrap_err("build agent config")?;
    let task_id = run_async(world.registry.create_task(&config)).wrap_err("create task")?;
    world.task_id = Some(task_id);
    Ok(())
}

fn initialize_task(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    run_async(world.registry.initialize_task(task_id)).wrap_err("initialize task")?;
    Ok(())
}

#[given(r#"a task created with instructions "{text}""#)]
fn task_created_with_instructions(
    world: &mut LifecycleWorld,
    text: String,
) -> Result<(), eyre::Report> {
    create_task(world, &text)
}

#[given("the task has been initialized")]
fn task_initialized(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    initialize_task(world)
}

#[given("the task has failed during execution")]
fn task_failed_during_execution(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.task_id()?;
    let executor = world.executor(StaticResultStrategy::failing("syntax error"));
    if run_async(executor.execute_task(task_id)).is_ok() {
        return Err(eyre::eyre!("expected the failing strategy to fail the task"));
    }
    Ok(())
}

#[given("a succeeded task with staged changes")]
fn succeeded_task_with_changes(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    create_task(world, "Document the scanner")?;
    initialize_task(world)?;
    let task_id = world.task_id()?;
    let executor = world.executor(StaticResultStrategy::succeeding(json!("documented")));
    run_async(executor.execute_task(task_id)).wrap_err("execute task")?;
    world
        .environment
        .stage_changes(
            task_id,
            vec![FileChange::new("docs/scanner.md", "# Scanner\n").wrap_err("build change")?],
        )
        .wrap_err("stage changes")?;
    Ok(())
}

#[given("the remote rejects pull request creation")]
fn remote_rejects_pull_requests(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    world
        .remote
        .fail_on(
            CommitStep::OpenPullRequest,
            RemoteError::Rejected {
                status: 422,
                message: "pull request creation disabled".to_owned(),
            },
        )
        .wrap_err("script remote failure")?;
    Ok(())
}
