//! Port for dispatching rendered instructions to an LLM-backed agent.

use crate::agent::domain::{ModelName, Toolkit};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for agent pipeline runs.
pub type AgentPipelineResult<T> = Result<T, AgentPipelineError>;

/// Everything the agent pipeline needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRunRequest {
    /// Agent name.
    pub agent_name: String,
    /// Model identifier.
    pub model: ModelName,
    /// Fully rendered instruction text.
    pub instructions: String,
    /// Toolkits constructed for this run.
    pub toolkits: Vec<Toolkit>,
    /// Session identifier, if the caller supplied one.
    pub session_id: Option<String>,
    /// Iteration budget.
    pub max_iters: u64,
}

/// External agent pipeline contract.
#[async_trait]
pub trait AgentPipeline: Send + Sync {
    /// Runs the agent to completion and returns its final output.
    async fn run(&self, request: AgentRunRequest) -> AgentPipelineResult<Value>;
}

/// Errors returned by agent pipeline implementations.
#[derive(Debug, Clone, Error)]
pub enum AgentPipelineError {
    /// The agent ran but did not produce a usable result.
    #[error("agent run failed: {0}")]
    Failed(String),

    /// The pipeline itself failed (transport, provider, or runtime).
    #[error("agent pipeline error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentPipelineError {
    /// Wraps a runtime error from the pipeline implementation.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
