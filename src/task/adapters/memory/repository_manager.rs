//! In-memory repository manager with failure injection.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::task::{
    domain::{BranchName, CommitStep, FileChange, PullRequestRef},
    ports::{RemoteError, RemoteResult, RepositoryManager},
};

/// URL prefix used for fabricated pull request links.
const PULL_REQUEST_URL_PREFIX: &str = "https://example.invalid/pulls";

/// A commit recorded by [`InMemoryRepositoryManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommit {
    /// Commit identifier handed back to the caller.
    pub id: String,
    /// Branch the commit was written to.
    pub branch: BranchName,
    /// Commit message.
    pub message: String,
    /// Files included in the commit.
    pub files: Vec<FileChange>,
}

/// Thread-safe in-memory stand-in for a remote hosting service.
///
/// The repository starts with a `main` branch. Failures and delays can be
/// scripted per commit step; a scripted failure persists until cleared so
/// repeated calls behave the same way.
#[derive(Debug, Clone)]
pub struct InMemoryRepositoryManager {
    state: Arc<RwLock<RemoteState>>,
}

#[derive(Debug, Default)]
struct RemoteState {
    branches: HashSet<BranchName>,
    commits: Vec<RecordedCommit>,
    pull_requests: HashMap<BranchName, PullRequestRef>,
    pull_request_bases: HashMap<BranchName, BranchName>,
    failures: HashMap<CommitStep, RemoteError>,
    delays: HashMap<CommitStep, Duration>,
    calls: Vec<CommitStep>,
    next_pull_request: u64,
}

impl Default for InMemoryRepositoryManager {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(err: impl std::fmt::Display) -> RemoteError {
    RemoteError::Network(format!("in-memory remote lock poisoned: {err}"))
}

impl InMemoryRepositoryManager {
    /// Creates a remote holding only the `main` branch.
    #[must_use]
    pub fn new() -> Self {
        let mut state = RemoteState {
            next_pull_request: 1,
            ..RemoteState::default()
        };
        if let Ok(main) = BranchName::new("main") {
            state.branches.insert(main);
        }
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Adds an existing branch to the remote.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn add_branch(&self, branch: BranchName) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.branches.insert(branch);
        Ok(())
    }

    /// Makes every subsequent call for `step` fail with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn fail_on(&self, step: CommitStep, error: RemoteError) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failures.insert(step, error);
        Ok(())
    }

    /// Removes all scripted failures.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn clear_failures(&self) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.failures.clear();
        Ok(())
    }

    /// Delays every subsequent call for `step` by `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn delay_on(&self, step: CommitStep, delay: Duration) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.delays.insert(step, delay);
        Ok(())
    }

    /// Returns the steps invoked so far, in call order.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn calls(&self) -> RemoteResult<Vec<CommitStep>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.calls.clone())
    }

    /// Returns whether the branch exists on the remote.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn has_branch(&self, branch: &BranchName) -> RemoteResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.branches.contains(branch))
    }

    /// Returns the commits recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn commits(&self) -> RemoteResult<Vec<RecordedCommit>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.commits.clone())
    }

    /// Returns the pull request opened from `branch`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn pull_request_for(&self, branch: &BranchName) -> RemoteResult<Option<PullRequestRef>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.pull_requests.get(branch).cloned())
    }

    /// Returns the base branch of the pull request opened from `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] if the internal lock is poisoned.
    pub fn pull_request_base(&self, branch: &BranchName) -> RemoteResult<Option<BranchName>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.pull_request_bases.get(branch).cloned())
    }

    /// Records the call and applies any scripted delay and failure.
    async fn enter(&self, step: CommitStep) -> RemoteResult<()> {
        let delay = {
            let mut state = self.state.write().map_err(lock_error)?;
            state.calls.push(step);
            state.delays.get(&step).copied()
        };
        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }
        let state = self.state.read().map_err(lock_error)?;
        match state.failures.get(&step) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RepositoryManager for InMemoryRepositoryManager {
    async fn create_branch(&self, base: &BranchName, name: &BranchName) -> RemoteResult<()> {
        self.enter(CommitStep::CreateBranch).await?;
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.branches.contains(base) {
            return Err(RemoteError::Rejected {
                status: 404,
                message: format!("base branch {base} does not exist"),
            });
        }
        if !state.branches.insert(name.clone()) {
            return Err(RemoteError::Conflict(format!(
                "branch {name} already exists"
            )));
        }
        Ok(())
    }

    async fn commit_changes(
        &self,
        branch: &BranchName,
        files: &[FileChange],
        message: &str,
    ) -> RemoteResult<String> {
        self.enter(CommitStep::CommitChanges).await?;
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.branches.contains(branch) {
            return Err(RemoteError::Rejected {
                status: 404,
                message: format!("branch {branch} does not exist"),
            });
        }
        let id = format!("{:040x}", state.commits.len() + 1);
        state.commits.push(RecordedCommit {
            id: id.clone(),
            branch: branch.clone(),
            message: message.to_owned(),
            files: files.to_vec(),
        });
        Ok(id)
    }

    async fn open_pull_request(
        &self,
        base: &BranchName,
        branch: &BranchName,
        _title: &str,
        _body: &str,
    ) -> RemoteResult<PullRequestRef> {
        self.enter(CommitStep::OpenPullRequest).await?;
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.branches.contains(base) {
            return Err(RemoteError::Rejected {
                status: 422,
                message: format!("base branch {base} does not exist"),
            });
        }
        if !state.branches.contains(branch) {
            return Err(RemoteError::Rejected {
                status: 422,
                message: format!("head branch {branch} does not exist"),
            });
        }
        if state.pull_requests.contains_key(branch) {
            return Err(RemoteError::Conflict(format!(
                "a pull request already exists for {branch}"
            )));
        }
        let number = state.next_pull_request;
        let pull_request =
            PullRequestRef::from_parts(number, format!("{PULL_REQUEST_URL_PREFIX}/{number}"))
                .map_err(|err| RemoteError::Rejected {
                    status: 500,
                    message: err.to_string(),
                })?;
        state.next_pull_request += 1;
        state
            .pull_requests
            .insert(branch.clone(), pull_request.clone());
        state
            .pull_request_bases
            .insert(branch.clone(), base.clone());
        Ok(pull_request)
    }
}
