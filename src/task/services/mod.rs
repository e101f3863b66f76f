//! Application services for task lifecycle orchestration.

mod executor;
mod locks;
mod registry;
mod runs;

pub use executor::{
    CancelOutcome, DEFAULT_CANCELLATION_GRACE, ExecutorSettings, TaskExecutor, TaskExecutorError,
    TaskExecutorResult,
};
#[cfg(test)]
pub(crate) use registry::RunReport;
pub use registry::{
    CommitFailureReason, CommitTaskRequest, DEFAULT_REMOTE_TIMEOUT, RegistrySettings,
    TaskRegistry, TaskRegistryError, TaskRegistryResult,
};
