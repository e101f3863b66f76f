//! Application services for agent setup.

mod toolkit_registry;

pub use toolkit_registry::{ToolkitConstructor, ToolkitRegistry};
