//! Agent configuration, instruction payloads, and toolkit registration.
//!
//! The agent module holds the pre-validated inputs consumed by the task
//! lifecycle engine: the [`domain::AgentConfig`] a task is created from, the
//! immutable [`domain::InstructionPayload`] handed to execution strategies,
//! and the explicit [`services::ToolkitRegistry`] that maps toolkit names to
//! constructor functions. The LLM pipeline itself is only reachable through
//! the [`ports::AgentPipeline`] port.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
