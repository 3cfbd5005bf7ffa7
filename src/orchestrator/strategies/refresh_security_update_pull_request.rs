use crate::{
    Result,
    change::DependencyChange,
    job::Job,
    orchestrator::{
        context::StrategyContext,
        strategies::refresh_version_update_pull_request::refresh_pull_request,
    },
    snapshot::DependencySnapshot,
};

/// Refreshes an open security pull request for a single dependency.
pub struct RefreshSecurityUpdatePullRequest {
    ctx: StrategyContext,
}

impl RefreshSecurityUpdatePullRequest {
    pub fn applies_to(job: &Job) -> bool {
        job.is_security()
            && job.is_refresh()
            && job.dependency_group_to_refresh.is_none()
            && job.directories().len() <= 1
    }

    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        refresh_pull_request(&self.ctx, snapshot).await
    }
}
