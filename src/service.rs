//! Hosting backend collaborator.
//!
//! The [`Service`] trait is the outbound surface of the orchestrator: every
//! pull request creation, update and closure as well as every error report
//! goes through it. Strategies never hold a `Service` directly, they go
//! through the [`manager::ServiceManager`] which adds logging and dry-run
//! handling.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{Result, UpdaterError, change::DependencyChange, job::Job};

pub mod manager;
pub mod types;

pub use manager::ServiceManager;
pub use types::{CloseReason, JobError};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Service: Send + Sync {
    async fn create_pull_request(
        &self,
        change: &DependencyChange,
        base_commit_sha: &str,
    ) -> Result<()>;

    async fn update_pull_request(
        &self,
        change: &DependencyChange,
        base_commit_sha: &str,
    ) -> Result<()>;

    async fn close_pull_request(
        &self,
        dependency_names: &[String],
        reason: CloseReason,
    ) -> Result<()>;

    async fn record_update_job_error(&self, error: JobError) -> Result<()>;

    /// Reports an unexpected error to the exception tracker.
    async fn capture_exception(
        &self,
        error: &UpdaterError,
        job: &Job,
    ) -> Result<()>;
}
