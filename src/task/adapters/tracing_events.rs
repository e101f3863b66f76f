//! Task event sink that writes structured `tracing` events.

use crate::task::ports::{TaskEvent, TaskEventSink};

/// Emits every task event as a structured `tracing` record.
///
/// State changes and creations are logged at `info`; commit failures at
/// `warn`. Subscribers filter on the `event` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTaskEventSink;

impl TaskEventSink for TracingTaskEventSink {
    fn emit(&self, event: &TaskEvent) {
        match event {
            TaskEvent::Created { task_id } => {
                tracing::info!(event = event.name(), task_id = %task_id, "task created");
            }
            TaskEvent::StateChanged { task_id, from, to } => {
                tracing::info!(
                    event = event.name(),
                    task_id = %task_id,
                    from = %from,
                    to = %to,
                    "task state changed"
                );
            }
            TaskEvent::CommitFailed {
                task_id,
                step,
                branch,
                reason,
            } => {
                tracing::warn!(
                    event = event.name(),
                    task_id = %task_id,
                    step = %step,
                    branch = %branch,
                    reason = %reason,
                    "task commit failed"
                );
            }
        }
    }
}
