//! Port contracts for the external agent pipeline.

pub mod pipeline;

pub use pipeline::{AgentPipeline, AgentPipelineError, AgentPipelineResult, AgentRunRequest};
