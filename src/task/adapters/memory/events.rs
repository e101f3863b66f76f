//! Event sink that records events for assertions.

use crate::task::ports::{TaskEvent, TaskEventSink};
use std::sync::{Arc, Mutex, PoisonError};

/// Task event sink that keeps every emitted event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTaskEventSink {
    events: Arc<Mutex<Vec<TaskEvent>>>,
}

impl RecordingTaskEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events emitted so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the names of the events emitted so far, oldest first.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events().iter().map(TaskEvent::name).collect()
    }
}

impl TaskEventSink for RecordingTaskEventSink {
    fn emit(&self, event: &TaskEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
