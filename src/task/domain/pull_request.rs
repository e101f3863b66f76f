//! Pull-request-reference value objects returned by the repository manager.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive pull request number from the remote hosting service.
///
/// # Examples
///
///     use taskpilot::task::domain::PullRequestNumber;
///
///     let pr_num = PullRequestNumber::new(42).expect("valid");
///     assert_eq!(pr_num.value(), 42);
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Creates a validated pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPullRequestNumber`] when the value
    /// is zero.
    pub const fn new(value: u64) -> Result<Self, TaskDomainError> {
        if value == 0 {
            return Err(TaskDomainError::InvalidPullRequestNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a pull request opened for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    number: PullRequestNumber,
    url: String,
}

impl PullRequestRef {
    /// Creates a pull request reference.
    #[must_use]
    pub fn new(number: PullRequestNumber, url: impl Into<String>) -> Self {
        Self {
            number,
            url: url.into(),
        }
    }

    /// Creates a pull request reference from raw remote values.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidPullRequestNumber`] when the number
    /// is zero.
    pub fn from_parts(number: u64, url: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self::new(PullRequestNumber::new(number)?, url))
    }

    /// Returns the pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    /// Returns the browser URL of the pull request.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.number, self.url)
    }
}
