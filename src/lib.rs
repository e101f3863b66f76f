//! Taskpilot: task lifecycle orchestration for AI coding agents.
//!
//! Taskpilot turns an agent configuration into a task, prepares a working
//! environment for it, runs it through a pluggable execution strategy, and
//! commits the resulting changes to a remote repository as a pull request.
//!
//! # Architecture
//!
//! Taskpilot follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//!
//! # Modules
//!
//! - [`agent`]: Agent configuration, instruction payloads, and toolkits
//! - [`task`]: Task state machine, execution, and commit orchestration

pub mod agent;
pub mod task;
