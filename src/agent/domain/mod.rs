//! Domain model for agent configuration and instruction payloads.

mod config;
mod error;
mod instructions;
mod toolkit;

pub use config::{
    AgentConfig, AgentConfigBuilder, DEFAULT_AGENT_NAME, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL,
    ModelName, SUPPORTED_MODELS,
};
pub use error::AgentDomainError;
pub use instructions::{InstructionPayload, InstructionPayloadBuilder};
pub use toolkit::{ToolDescriptor, Toolkit, ToolkitName};
