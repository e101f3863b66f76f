//! GitHub REST adapter for the repository manager port.
//!
//! Branches are git refs, commits are built as tree + commit + ref update,
//! and pull requests are opened against the branch the work started from.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fmt;

use crate::task::{
    domain::{BranchName, FileChange, PullRequestRef},
    ports::{RemoteError, RemoteResult, RepositoryManager},
};

/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("taskpilot/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const REGULAR_FILE_MODE: &str = "100644";

/// Repository coordinates in `owner/name` form.
///
/// # Examples
///
///     use taskpilot::task::adapters::github::RepositoryFullName;
///
///     let repo = RepositoryFullName::new("octo/widgets").expect("valid");
///     assert_eq!(repo.owner(), "octo");
///     assert_eq!(repo.name(), "widgets");
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryFullName(String);

impl RepositoryFullName {
    /// Creates validated repository coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Rejected`] when the value is not `owner/name`.
    pub fn new(value: impl Into<String>) -> RemoteResult<Self> {
        let raw = value.into();
        let trimmed = raw.trim();
        let mut parts = trimmed.split('/');
        let is_valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !is_valid {
            return Err(RemoteError::Rejected {
                status: 400,
                message: format!("repository must be owner/name, got '{raw}'"),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    /// Returns the repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or_default()
    }
}

impl fmt::Display for RepositoryFullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection settings for [`GitHubRepositoryManager`].
#[derive(Clone)]
pub struct GitHubSettings {
    api_base: String,
    repository: RepositoryFullName,
    token: String,
}

impl GitHubSettings {
    /// Creates settings for `repository` using the public API base.
    #[must_use]
    pub fn new(repository: RepositoryFullName, token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            repository,
            token: token.into(),
        }
    }

    /// Overrides the API base URL, for GitHub Enterprise installations.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Returns the repository coordinates.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryFullName {
        &self.repository
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{path}",
            self.api_base.trim_end_matches('/'),
            self.repository
        )
    }
}

impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("api_base", &self.api_base)
            .field("repository", &self.repository)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Repository manager backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubRepositoryManager {
    client: Client,
    settings: GitHubSettings,
}

#[derive(Debug, Deserialize)]
struct ShaObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaObject,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: ShaObject,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GitHubRepositoryManager {
    /// Creates a manager with a fresh HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Network`] when the HTTP client cannot be built.
    pub fn new(settings: GitHubSettings) -> RemoteResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        Ok(Self::with_client(client, settings))
    }

    /// Creates a manager around an existing HTTP client.
    #[must_use]
    pub const fn with_client(client: Client, settings: GitHubSettings) -> Self {
        Self { client, settings }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.settings.token)
            .header(reqwest::header::ACCEPT, ACCEPT)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| RemoteError::Network(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| RemoteError::Network(err.to_string()));
        }
        let message = response.json::<ErrorBody>().await.map_or_else(
            |_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            },
            |body| body.message,
        );
        Err(map_status(status, message))
    }

    async fn branch_head(&self, branch: &BranchName) -> RemoteResult<String> {
        let url = self.settings.repo_url(&format!("git/ref/heads/{branch}"));
        let head: RefResponse = self.send(self.client.get(url)).await?;
        Ok(head.object.sha)
    }
}

/// Maps a non-success HTTP status to a typed remote error.
fn map_status(status: StatusCode, message: String) -> RemoteError {
    match status.as_u16() {
        401 | 403 => RemoteError::Auth(message),
        409 | 422 => RemoteError::Conflict(message),
        code @ 500..=599 => RemoteError::Network(format!("status {code}: {message}")),
        code => RemoteError::Rejected {
            status: code,
            message,
        },
    }
}

#[async_trait]
impl RepositoryManager for GitHubRepositoryManager {
    async fn create_branch(&self, base: &BranchName, name: &BranchName) -> RemoteResult<()> {
        let sha = self.branch_head(base).await?;
        let url = self.settings.repo_url("git/refs");
        let body = json!({ "ref": format!("refs/heads/{name}"), "sha": sha });
        let _: RefResponse = self.send(self.client.post(url).json(&body)).await?;
        tracing::debug!(branch = %name, base = %base, "created remote branch");
        Ok(())
    }

    async fn commit_changes(
        &self,
        branch: &BranchName,
        files: &[FileChange],
        message: &str,
    ) -> RemoteResult<String> {
        let head = self.branch_head(branch).await?;

        let commit_url = self.settings.repo_url(&format!("git/commits/{head}"));
        let parent: CommitResponse = self.send(self.client.get(commit_url)).await?;

        let entries: Vec<_> = files
            .iter()
            .map(|file| {
                json!({
                    "path": file.path(),
                    "mode": REGULAR_FILE_MODE,
                    "type": "blob",
                    "content": file.contents(),
                })
            })
            .collect();
        let tree_body = json!({ "base_tree": parent.tree.sha, "tree": entries });
        let tree: ShaObject = self
            .send(
                self.client
                    .post(self.settings.repo_url("git/trees"))
                    .json(&tree_body),
            )
            .await?;

        let commit_body = json!({ "message": message, "tree": tree.sha, "parents": [head] });
        let commit: ShaObject = self
            .send(
                self.client
                    .post(self.settings.repo_url("git/commits"))
                    .json(&commit_body),
            )
            .await?;

        let ref_url = self.settings.repo_url(&format!("git/refs/heads/{branch}"));
        let update = json!({ "sha": commit.sha, "force": false });
        let _: RefResponse = self.send(self.client.patch(ref_url).json(&update)).await?;
        tracing::debug!(
            branch = %branch,
            commit = %commit.sha,
            files = files.len(),
            "pushed commit"
        );
        Ok(commit.sha)
    }

    async fn open_pull_request(
        &self,
        base: &BranchName,
        branch: &BranchName,
        title: &str,
        body: &str,
    ) -> RemoteResult<PullRequestRef> {
        let url = self.settings.repo_url("pulls");
        let request = json!({
            "title": title,
            "body": body,
            "head": branch.as_str(),
            "base": base.as_str(),
        });
        let pull: PullResponse = self.send(self.client.post(url).json(&request)).await?;
        PullRequestRef::from_parts(pull.number, pull.html_url).map_err(|err| {
            RemoteError::Rejected {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: err.to_string(),
            }
        })
    }
}
