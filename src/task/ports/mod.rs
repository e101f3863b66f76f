//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod environment;
pub mod events;
pub mod execution;
pub mod repository_manager;
pub mod store;

pub use environment::{EnvironmentError, EnvironmentResult, TaskEnvironment};
pub use events::{TaskEvent, TaskEventSink};
pub use execution::{ExecutionError, ExecutionJob, ExecutionResult, ExecutionStrategy};
#[cfg(test)]
pub use repository_manager::MockRepositoryManager;
pub use repository_manager::{RemoteError, RemoteResult, RepositoryManager};
pub use store::{TaskSnapshot, TaskStore, TaskStoreError, TaskStoreResult};
