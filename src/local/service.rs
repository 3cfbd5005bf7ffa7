//! Service that logs and records every call instead of talking to a
//! hosting backend.
use async_trait::async_trait;
use log::*;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    Result, UpdaterError,
    change::DependencyChange,
    job::Job,
    service::{CloseReason, JobError, Service},
};

/// One call received by the [`LogService`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceEvent {
    CreatePullRequest {
        dependencies: Vec<String>,
        group: Option<String>,
        files: Vec<String>,
        base_commit_sha: String,
    },
    UpdatePullRequest {
        dependencies: Vec<String>,
        group: Option<String>,
        files: Vec<String>,
        base_commit_sha: String,
    },
    ClosePullRequest {
        dependencies: Vec<String>,
        reason: CloseReason,
    },
    RecordUpdateJobError(JobError),
    CaptureException {
        job_id: String,
        message: String,
    },
}

/// Clones share the same event log.
#[derive(Default, Clone)]
pub struct LogService {
    events: Arc<Mutex<Vec<ServiceEvent>>>,
}

impl LogService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in order.
    pub async fn events(&self) -> Vec<ServiceEvent> {
        self.events.lock().await.clone()
    }

    async fn push(&self, event: ServiceEvent) {
        self.events.lock().await.push(event);
    }
}

fn file_paths(change: &DependencyChange) -> Vec<String> {
    change
        .updated_dependency_files
        .iter()
        .map(|f| f.path())
        .collect()
}

#[async_trait]
impl Service for LogService {
    async fn create_pull_request(
        &self,
        change: &DependencyChange,
        base_commit_sha: &str,
    ) -> Result<()> {
        let event = ServiceEvent::CreatePullRequest {
            dependencies: change.updated_dependency_names(),
            group: change.group.clone(),
            files: file_paths(change),
            base_commit_sha: base_commit_sha.to_string(),
        };
        info!("local: {event:?}");
        self.push(event).await;
        Ok(())
    }

    async fn update_pull_request(
        &self,
        change: &DependencyChange,
        base_commit_sha: &str,
    ) -> Result<()> {
        let event = ServiceEvent::UpdatePullRequest {
            dependencies: change.updated_dependency_names(),
            group: change.group.clone(),
            files: file_paths(change),
            base_commit_sha: base_commit_sha.to_string(),
        };
        info!("local: {event:?}");
        self.push(event).await;
        Ok(())
    }

    async fn close_pull_request(
        &self,
        dependency_names: &[String],
        reason: CloseReason,
    ) -> Result<()> {
        let event = ServiceEvent::ClosePullRequest {
            dependencies: dependency_names.to_vec(),
            reason,
        };
        info!("local: {event:?}");
        self.push(event).await;
        Ok(())
    }

    async fn record_update_job_error(&self, error: JobError) -> Result<()> {
        info!("local: {} {}", error.error_type, error.details);
        self.push(ServiceEvent::RecordUpdateJobError(error)).await;
        Ok(())
    }

    async fn capture_exception(
        &self,
        error: &UpdaterError,
        job: &Job,
    ) -> Result<()> {
        warn!("local: exception in job {}: {error}", job.id);
        self.push(ServiceEvent::CaptureException {
            job_id: job.id.clone(),
            message: error.to_string(),
        })
        .await;
        Ok(())
    }
}
