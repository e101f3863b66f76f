//! Task lifecycle orchestration.
//!
//! A task moves through `Created`, `Initialized`, `Running`, and `Succeeded`
//! or `Failed`, and a succeeded task is finally committed to a branch with a
//! pull request (`Committed`) or recorded as `CommitFailed`. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
