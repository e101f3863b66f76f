//! In-memory adapters for task lifecycle ports.
//!
//! These adapters keep all state in process memory behind `RwLock`s. They are
//! deterministic, support failure injection, and back the unit, integration,
//! and behaviour tests.

mod environment;
mod events;
mod repository_manager;
mod store;

pub use environment::InMemoryTaskEnvironment;
pub use events::RecordingTaskEventSink;
pub use repository_manager::{InMemoryRepositoryManager, RecordedCommit};
pub use store::InMemoryTaskStore;
