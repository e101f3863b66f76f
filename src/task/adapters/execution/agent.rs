//! Strategy that dispatches a task to the agent pipeline.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::agent::{
    domain::{AgentDomainError, DEFAULT_AGENT_NAME, DEFAULT_MAX_ITERATIONS, ModelName, ToolkitName},
    ports::{AgentPipeline, AgentPipelineError, AgentRunRequest},
    services::ToolkitRegistry,
};
use crate::task::{
    domain::metadata,
    ports::{ExecutionError, ExecutionJob, ExecutionResult, ExecutionStrategy},
};

/// Execution strategy backed by an LLM agent pipeline.
///
/// The agent configuration captured in task metadata at creation is turned
/// back into a run request: instructions are rendered, toolkits constructed
/// from the registry, and the pipeline raced against cancellation.
pub struct AgentPipelineStrategy<P>
where
    P: AgentPipeline,
{
    pipeline: Arc<P>,
    toolkits: Arc<ToolkitRegistry>,
}

impl<P> AgentPipelineStrategy<P>
where
    P: AgentPipeline,
{
    /// Creates a strategy from a pipeline and toolkit registry.
    #[must_use]
    pub const fn new(pipeline: Arc<P>, toolkits: Arc<ToolkitRegistry>) -> Self {
        Self { pipeline, toolkits }
    }

    /// Builds the pipeline request for a job.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::Failed`] when the captured configuration no
    /// longer validates or the instructions fail to render.
    pub fn request_for(&self, job: &ExecutionJob) -> ExecutionResult<AgentRunRequest> {
        self.build_request(job).map_err(|err| ExecutionError::Failed(err.to_string()))
    }

    fn build_request(&self, job: &ExecutionJob) -> Result<AgentRunRequest, AgentDomainError> {
        let model = job
            .metadata_value(metadata::MODEL)
            .map(ModelName::new)
            .transpose()?
            .unwrap_or_default();
        let names = job
            .metadata_value(metadata::TOOLKITS)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToolkitName::new)
            .collect::<Result<Vec<_>, _>>()?;
        let toolkits = self.toolkits.build(&names)?;
        let max_iters = job
            .metadata_value(metadata::MAX_ITERS)
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_ITERATIONS);

        Ok(AgentRunRequest {
            agent_name: job
                .metadata_value(metadata::AGENT)
                .unwrap_or(DEFAULT_AGENT_NAME)
                .to_owned(),
            model,
            instructions: job.instructions().render()?,
            toolkits,
            session_id: job.metadata_value(metadata::SESSION_ID).map(str::to_owned),
            max_iters,
        })
    }
}

#[async_trait]
impl<P> ExecutionStrategy for AgentPipelineStrategy<P>
where
    P: AgentPipeline,
{
    async fn run(
        &self,
        job: &ExecutionJob,
        cancellation: CancellationToken,
    ) -> ExecutionResult<Value> {
        let request = self.request_for(job)?;
        tracing::debug!(
            task_id = %job.task_id(),
            agent = %request.agent_name,
            model = %request.model,
            toolkits = request.toolkits.len(),
            "dispatching task to agent pipeline"
        );
        tokio::select! {
            outcome = self.pipeline.run(request) => outcome.map_err(|err| match err {
                AgentPipelineError::Failed(message) => ExecutionError::Failed(message),
                AgentPipelineError::Runtime(source) => ExecutionError::Runtime(source),
            }),
            () = cancellation.cancelled() => Err(ExecutionError::Cancelled),
        }
    }
}
