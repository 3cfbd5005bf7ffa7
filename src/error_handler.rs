//! Classification and reporting of errors raised while updating a single
//! dependency or group. Reporting never fails the caller: problems talking
//! to the service are logged and swallowed.
use log::*;
use serde_json::{Value, json};
use std::rc::Rc;

use crate::{
    UpdaterError,
    dependency::Dependency,
    job::Job,
    service::{JobError, ServiceManager},
    snapshot::DependencyGroup,
};

pub const UNKNOWN_ERROR: &str = "unknown_error";

/// Stable error type reported for `error`, with its details. Returns None
/// for errors that have no dedicated type.
pub fn classify(error: &UpdaterError) -> Option<(&'static str, Value)> {
    let classified = match error {
        UpdaterError::DependencyFileNotFound(path) => {
            ("dependency_file_not_found", json!({ "file-path": path }))
        }
        UpdaterError::DependencyFileNotResolvable(message) => (
            "dependency_file_not_resolvable",
            json!({ "message": message }),
        ),
        UpdaterError::PrivateSourceAuthenticationFailure(source) => (
            "private_source_authentication_failure",
            json!({ "source": source }),
        ),
        UpdaterError::PrivateSourceTimedOut(source) => {
            ("private_source_timed_out", json!({ "source": source }))
        }
        UpdaterError::GitDependenciesNotReachable(urls) => (
            "git_dependencies_not_reachable",
            json!({ "dependency-urls": urls }),
        ),
        UpdaterError::AllVersionsIgnored { dependency } => (
            "all_versions_ignored",
            json!({ "dependency-name": dependency }),
        ),
        UpdaterError::InconsistentRegistryResponse(message) => (
            "inconsistent_registry_response",
            json!({ "message": message }),
        ),
        _ => return None,
    };

    Some(classified)
}

pub struct ErrorHandler {
    service: Rc<ServiceManager>,
    job: Rc<Job>,
}

impl ErrorHandler {
    pub fn new(service: Rc<ServiceManager>, job: Rc<Job>) -> Self {
        Self { service, job }
    }

    /// Reports an error raised while updating `dependency`.
    pub async fn handle_dependency_error(
        &self,
        error: &UpdaterError,
        dependency: &Dependency,
    ) {
        match classify(error) {
            Some((error_type, details)) => {
                self.log_dependency_error(
                    dependency,
                    error,
                    error_type,
                    &details.to_string(),
                );
                self.record(JobError::new(error_type, details)).await;
            }
            None => {
                self.log_dependency_error(
                    dependency,
                    error,
                    UNKNOWN_ERROR,
                    &error.to_string(),
                );
                self.capture(error).await;
                self.record(JobError::new(
                    UNKNOWN_ERROR,
                    json!({
                        "error-message": error.to_string(),
                        "dependency-name": dependency.name,
                    }),
                ))
                .await;
            }
        }
    }

    /// Reports an error raised outside a single dependency, typically while
    /// updating `group`.
    pub async fn handle_job_error(
        &self,
        error: &UpdaterError,
        group: Option<&DependencyGroup>,
    ) {
        let group_name = group.map(|g| g.name.as_str());

        match classify(error) {
            Some((error_type, details)) => {
                error!(
                    "error processing group {}: {error_type} {details}",
                    group_name.unwrap_or("-")
                );
                self.record(JobError::new(error_type, details)).await;
            }
            None => {
                error!(
                    "error processing group {}: {error}",
                    group_name.unwrap_or("-")
                );
                self.capture(error).await;

                let mut details = json!({ "error-message": error.to_string() });
                if let Some(name) = group_name {
                    details["dependency-group"] = json!(name);
                }
                self.record(JobError::new(UNKNOWN_ERROR, details)).await;
            }
        }
    }

    /// Logs a dependency-level error without reporting it.
    pub fn log_dependency_error(
        &self,
        dependency: &Dependency,
        error: &UpdaterError,
        error_type: &str,
        detail: &str,
    ) {
        error!(
            "error processing {} ({}): {error}",
            dependency.name, error_type
        );
        debug!("{} {} detail: {detail}", self.job.id, dependency.name);
    }

    /// Records an informational outcome such as
    /// `security_update_not_needed`.
    pub async fn record(&self, error: JobError) {
        if let Err(e) = self.service.record_update_job_error(error).await {
            warn!("failed to record job error: {e}");
        }
    }

    async fn capture(&self, error: &UpdaterError) {
        if let Err(e) = self.service.capture_exception(error, &self.job).await {
            warn!("failed to capture exception: {e}");
        }
    }
}
