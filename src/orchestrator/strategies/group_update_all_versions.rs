//! Grouped version updates: one pull request per configured group, then
//! individual pull requests for everything no group claimed.
use log::*;

use crate::{
    Result,
    change::DependencyChange,
    job::Job,
    orchestrator::{
        context::StrategyContext,
        directory::HandledPolicy,
        group::GroupOrchestrator,
        strategies::update_all_versions::update_ungrouped_dependencies,
    },
    snapshot::DependencySnapshot,
};

pub struct GroupUpdateAllVersions {
    ctx: StrategyContext,
}

impl GroupUpdateAllVersions {
    pub fn applies_to(job: &Job) -> bool {
        !job.is_security()
            && !job.is_refresh()
            && !job.has_named_dependencies()
            && job.version_groups().next().is_some()
    }

    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        let mut submitted = GroupOrchestrator::new(&self.ctx, HandledPolicy::Keep)
            .run(snapshot)
            .await?;

        info!(
            "finished group updates, {} dependencies handled",
            snapshot.handled_dependencies().len()
        );

        submitted.extend(update_ungrouped_dependencies(&self.ctx, snapshot).await?);

        Ok(submitted)
    }
}
