//! Port for the remote version-control hosting service.

use crate::task::domain::{BranchName, FileChange, PullRequestRef};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for remote repository operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Branch, commit, and pull request operations on the remote repository.
///
/// Every call is a non-idempotent remote side effect. Callers must not retry
/// blindly: a failed call may still have taken effect remotely.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryManager: Send + Sync {
    /// Creates branch `name` pointing at the head of `base`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] when `name` already exists,
    /// [`RemoteError::Auth`] when credentials are rejected, and
    /// [`RemoteError::Network`] on transport failure.
    async fn create_branch(&self, base: &BranchName, name: &BranchName) -> RemoteResult<()>;

    /// Commits the files onto `branch` and returns the new commit id.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] when the branch moved in a way that
    /// prevents a fast-forward, and [`RemoteError::Network`] on transport
    /// failure.
    async fn commit_changes(
        &self,
        branch: &BranchName,
        files: &[FileChange],
        message: &str,
    ) -> RemoteResult<String>;

    /// Opens a pull request from `branch` into `base`.
    ///
    /// `base` is the branch `branch` was created from.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] when a pull request already exists
    /// for the branch.
    async fn open_pull_request(
        &self,
        base: &BranchName,
        branch: &BranchName,
        title: &str,
        body: &str,
    ) -> RemoteResult<PullRequestRef>;
}

/// Typed failure kinds reported by repository manager adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote state conflicts with the request.
    #[error("remote conflict: {0}")]
    Conflict(String),

    /// Credentials were missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The request did not complete at the transport level.
    #[error("network error: {0}")]
    Network(String),

    /// The remote rejected the request for another reason.
    #[error("remote rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP-like status code reported by the remote.
        status: u16,
        /// Remote-provided message.
        message: String,
    },
}
