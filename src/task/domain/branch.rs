//! Branch-name value objects for task commits.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a validated branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 200;

/// Branch that commit branches start from unless configured otherwise.
pub const DEFAULT_BASE_BRANCH: &str = "main";

/// Characters Git rejects anywhere in a ref name.
const FORBIDDEN_CHARACTERS: [char; 8] = [':', '~', '^', '?', '*', '[', '\\', ' '];

/// Validated Git branch name.
///
/// Branch names must be non-empty after trimming, must follow the subset of
/// `git-check-ref-format` rules that matter for remote branch creation, and
/// must not exceed `MAX_BRANCH_NAME_LENGTH` characters.
///
/// # Examples
///
///     use taskpilot::task::domain::BranchName;
///
///     let name = BranchName::new("feature/my-branch").expect("valid");
///     assert_eq!(name.as_str(), "feature/my-branch");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidBranchName`] when the value is empty,
    /// contains characters Git forbids, or exceeds the length limit.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_branch_name(normalized) {
            return Err(TaskDomainError::InvalidBranchName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the default base branch, `main`.
    #[must_use]
    pub fn default_base() -> Self {
        Self(DEFAULT_BASE_BRANCH.to_owned())
    }

    /// Validates branch name constraints.
    fn is_invalid_branch_name(name: &str) -> bool {
        let is_empty = name.is_empty();
        let contains_forbidden_char = name
            .chars()
            .any(|character| FORBIDDEN_CHARACTERS.contains(&character) || character.is_control());
        let has_bad_sequence = name.contains("..") || name.contains("@{") || name.contains("//");
        let has_bad_edge = name.starts_with(['-', '/', '.'])
            || name.ends_with(['/', '.'])
            || name.ends_with(".lock");
        let exceeds_length_limit = name.len() > MAX_BRANCH_NAME_LENGTH;

        is_empty
            || contains_forbidden_char
            || has_bad_sequence
            || has_bad_edge
            || exceeds_length_limit
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for BranchName {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
