//! Manager that wraps service implementations
use log::*;

use crate::{
    Result, UpdaterError,
    change::DependencyChange,
    job::Job,
    service::{CloseReason, JobError, Service},
};

pub struct ServiceManager {
    service: Box<dyn Service>,
    dry_run: bool,
}

impl ServiceManager {
    pub fn new(service: Box<dyn Service>) -> Self {
        Self {
            service,
            dry_run: false,
        }
    }

    /// Logs pull request operations instead of sending them.
    pub fn dry_run(service: Box<dyn Service>) -> Self {
        Self {
            service,
            dry_run: true,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn create_pull_request(
        &self,
        change: &DependencyChange,
        base_commit_sha: &str,
    ) -> Result<()> {
        let names = change.updated_dependency_names().join(", ");

        if self.dry_run {
            warn!("dry_run: would create pull request for: {names}");
            return Ok(());
        }

        info!("creating pull request for: {names}");
        self.service
            .create_pull_request(change, base_commit_sha)
            .await
    }

    pub async fn update_pull_request(
        &self,
        change: &DependencyChange,
        base_commit_sha: &str,
    ) -> Result<()> {
        let names = change.updated_dependency_names().join(", ");

        if self.dry_run {
            warn!("dry_run: would update pull request for: {names}");
            return Ok(());
        }

        info!("updating pull request for: {names}");
        self.service
            .update_pull_request(change, base_commit_sha)
            .await
    }

    pub async fn close_pull_request(
        &self,
        dependency_names: &[String],
        reason: CloseReason,
    ) -> Result<()> {
        let names = dependency_names.join(", ");

        if self.dry_run {
            warn!("dry_run: would close pull request for: {names} ({reason})");
            return Ok(());
        }

        info!("closing pull request for: {names} ({reason})");
        self.service.close_pull_request(dependency_names, reason).await
    }

    pub async fn record_update_job_error(&self, error: JobError) -> Result<()> {
        debug!("recording job error: {}", error.error_type);
        self.service.record_update_job_error(error).await
    }

    pub async fn capture_exception(
        &self,
        error: &UpdaterError,
        job: &Job,
    ) -> Result<()> {
        error!("capturing exception for job {}: {error}", job.id);
        self.service.capture_exception(error, job).await
    }
}
