//! Well-known task metadata keys.
//!
//! Creation keys are copied from the agent configuration. Commit keys are
//! written only by the registry while committing a task, so that a partially
//! completed remote sequence can be resumed by hand.

use crate::agent::domain::AgentConfig;
use std::collections::BTreeMap;

/// Agent name the task was created for.
pub const AGENT: &str = "agent";
/// Model identifier.
pub const MODEL: &str = "model";
/// Comma-separated toolkit names.
pub const TOOLKITS: &str = "toolkits";
/// Session identifier.
pub const SESSION_ID: &str = "session_id";
/// Iteration budget.
pub const MAX_ITERS: &str = "max_iters";

/// Branch created for the commit.
pub const COMMIT_BRANCH: &str = "commit.branch";
/// Remote commit identifier.
pub const COMMIT_ID: &str = "commit.id";
/// Commit sub-step that failed.
pub const COMMIT_FAILED_STEP: &str = "commit.failed_step";
/// Pull request number.
pub const PULL_REQUEST_NUMBER: &str = "pull_request.number";
/// Pull request URL.
pub const PULL_REQUEST_URL: &str = "pull_request.url";

/// Builds the creation metadata recorded for an agent configuration.
///
///     use taskpilot::agent::domain::{AgentConfig, InstructionPayload};
///     use taskpilot::task::domain::metadata;
///
///     let instructions = InstructionPayload::builder("Run").build().expect("valid");
///     let config = AgentConfig::builder(instructions).build().expect("valid");
///     let entries = metadata::from_config(&config);
///     assert_eq!(entries.get(metadata::MODEL).map(String::as_str), Some("gpt-4"));
///     assert!(!entries.contains_key(metadata::SESSION_ID));
#[must_use]
pub fn from_config(config: &AgentConfig) -> BTreeMap<String, String> {
    let toolkits = config
        .toolkits()
        .iter()
        .map(|toolkit| toolkit.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let mut entries = BTreeMap::from([
        (AGENT.to_owned(), config.name().to_owned()),
        (MODEL.to_owned(), config.model().as_str().to_owned()),
        (TOOLKITS.to_owned(), toolkits),
        (MAX_ITERS.to_owned(), config.max_iters().to_string()),
    ]);
    if let Some(session_id) = config.session_id() {
        entries.insert(SESSION_ID.to_owned(), session_id.to_owned());
    }
    entries
}
