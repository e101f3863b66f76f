//! Adapter implementations for task lifecycle ports.

pub mod execution;
pub mod github;
pub mod memory;
pub mod postgres;
mod tracing_events;
pub mod workspace;

pub use tracing_events::TracingTaskEventSink;
