//! Values describing a task's commit sequence.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sub-step of the commit sequence, recorded when a commit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStep {
    /// Gathering changed files from the task's working environment.
    CollectChanges,
    /// Creating the remote branch.
    CreateBranch,
    /// Pushing the commit to the remote branch.
    CommitChanges,
    /// Opening the pull request.
    OpenPullRequest,
}

impl CommitStep {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CollectChanges => "collect_changes",
            Self::CreateBranch => "create_branch",
            Self::CommitChanges => "commit_changes",
            Self::OpenPullRequest => "open_pull_request",
        }
    }
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file written by the agent, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    path: String,
    contents: String,
}

impl FileChange {
    /// Creates a validated file change.
    ///
    /// Paths use `/` separators and must stay inside the repository.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidFilePath`] when the path is empty,
    /// absolute, or contains `.` / `..` segments.
    pub fn new(
        path: impl Into<String>,
        contents: impl Into<String>,
    ) -> Result<Self, TaskDomainError> {
        let raw = path.into();
        let is_valid = !raw.is_empty()
            && !raw.starts_with('/')
            && raw
                .split('/')
                .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
        if !is_valid {
            return Err(TaskDomainError::InvalidFilePath(raw));
        }
        Ok(Self {
            path: raw,
            contents: contents.into(),
        })
    }

    /// Returns the repository-relative path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the file contents.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }
}
