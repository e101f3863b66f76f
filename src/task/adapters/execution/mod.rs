//! Execution strategy adapters.

mod agent;
mod fixed;

pub use agent::AgentPipelineStrategy;
pub use fixed::StaticResultStrategy;
