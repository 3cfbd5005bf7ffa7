//! Offline implementations of every collaborator, driven by a workspace
//! fixture file.
pub mod builder;
pub mod checker;
pub mod service;
pub mod workspace;

pub use builder::LiteralChangeBuilder;
pub use checker::{RegistryEntry, StaticCheckerFactory};
pub use service::{LogService, ServiceEvent};
pub use workspace::Workspace;
