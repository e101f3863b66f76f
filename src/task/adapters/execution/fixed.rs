//! Strategy that returns a preconfigured outcome.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::task::ports::{ExecutionError, ExecutionJob, ExecutionResult, ExecutionStrategy};

#[derive(Debug, Clone)]
enum Outcome {
    Succeed(Value),
    Fail(String),
}

/// Execution strategy with a fixed outcome.
///
/// Serves as the no-op strategy for dry runs and as a controllable strategy
/// in tests. An optional delay simulates long-running work; by default the
/// delay ends early when the run is cancelled.
///
/// # Examples
///
///     use serde_json::json;
///     use taskpilot::task::adapters::execution::StaticResultStrategy;
///
///     let strategy = StaticResultStrategy::succeeding(json!({ "ok": true }));
///     assert_eq!(strategy.run_count(), 0);
#[derive(Debug, Clone)]
pub struct StaticResultStrategy {
    outcome: Outcome,
    delay: Option<Duration>,
    honours_cancellation: bool,
    runs: Arc<AtomicUsize>,
}

impl StaticResultStrategy {
    /// Creates a strategy that always succeeds with `result`.
    #[must_use]
    pub fn succeeding(result: Value) -> Self {
        Self::with_outcome(Outcome::Succeed(result))
    }

    /// Creates a strategy that always fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Fail(message.into()))
    }

    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            delay: None,
            honours_cancellation: true,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits for `delay` before producing the outcome.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Keeps waiting through cancellation, like a strategy stuck in I/O.
    #[must_use]
    pub const fn ignoring_cancellation(mut self) -> Self {
        self.honours_cancellation = false;
        self
    }

    /// Returns how many runs have started.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionStrategy for StaticResultStrategy {
    async fn run(
        &self,
        job: &ExecutionJob,
        cancellation: CancellationToken,
    ) -> ExecutionResult<Value> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(task_id = %job.task_id(), "static strategy started");

        if let Some(delay) = self.delay {
            if self.honours_cancellation {
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = cancellation.cancelled() => return Err(ExecutionError::Cancelled),
                }
            } else {
                tokio::time::sleep(delay).await;
            }
        }

        match &self.outcome {
            Outcome::Succeed(result) => Ok(result.clone()),
            Outcome::Fail(message) => Err(ExecutionError::Failed(message.clone())),
        }
    }
}
