//! Domain model for task lifecycle management.
//!
//! The task domain models a unit of agent work, its lifecycle state machine,
//! and the branch and pull request values produced when its changes are
//! committed, while keeping all infrastructure concerns outside of the domain
//! boundary.

mod branch;
mod commit;
mod error;
mod ids;
pub mod metadata;
mod pull_request;
mod task;

pub use branch::{BranchName, DEFAULT_BASE_BRANCH};
pub use commit::{CommitStep, FileChange};
pub use error::{ParseTaskStateError, TaskDomainError};
pub use ids::TaskId;
pub use pull_request::{PullRequestNumber, PullRequestRef};
pub use task::{FailureKind, PersistedTaskData, Task, TaskFailure, TaskState};
