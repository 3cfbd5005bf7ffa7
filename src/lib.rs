//! Update-strategy selection and pull request lifecycle orchestration for
//! dependency update jobs.
//!
//! A job names a repository, one or more directories and the update
//! configuration. The [`orchestrator::Orchestrator`] picks the single
//! strategy that applies to the job, computes the dependency changes with
//! the [`checker::UpdateChecker`] and [`change_builder::DependencyChangeBuilder`]
//! collaborators and reconciles them against open pull requests through a
//! [`service::Service`].
pub mod change;
pub mod change_builder;
pub mod checker;
pub mod cli;
pub mod dependency;
pub mod error;
pub mod error_handler;
pub mod helpers;
pub mod job;
pub mod local;
pub mod matcher;
pub mod orchestrator;
pub mod service;
pub mod snapshot;
pub mod unlock;

pub use error::{Result, UpdaterError};

#[cfg(test)]
pub mod test_helpers;
