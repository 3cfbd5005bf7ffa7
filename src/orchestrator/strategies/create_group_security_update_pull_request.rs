//! Grouped security updates. Configured security groups each get a pull
//! request; the remaining named dependencies share one.
use crate::{
    Result,
    change::DependencyChange,
    job::Job,
    orchestrator::{
        context::StrategyContext,
        directory::HandledPolicy,
        group::{GroupOrchestrator, GroupSource},
    },
    snapshot::DependencySnapshot,
};

/// Whether a security job updates its dependencies together.
pub fn is_grouped(job: &Job) -> bool {
    job.directories().len() > 1
        || (job.security_groups().next().is_some()
            && job.named_dependencies().len() > 1)
}

/// Name of the synthesized group for a job's named dependencies.
pub fn security_group_name(job: &Job) -> String {
    format!("{} security updates", job.package_manager)
}

pub struct CreateGroupSecurityUpdatePullRequest {
    ctx: StrategyContext,
}

impl CreateGroupSecurityUpdatePullRequest {
    pub fn applies_to(job: &Job) -> bool {
        job.is_security() && !job.is_refresh() && is_grouped(job)
    }

    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        if snapshot.all_job_dependencies().is_empty() {
            self.ctx.record_security_update_dependency_not_found().await;
            return Ok(vec![]);
        }

        let orchestrator =
            GroupOrchestrator::new(&self.ctx, HandledPolicy::Keep);

        let mut sources = orchestrator
            .prescan(snapshot)
            .into_iter()
            .map(GroupSource::Configured)
            .collect::<Vec<GroupSource>>();

        sources.push(GroupSource::JobDependencies {
            name: security_group_name(&self.ctx.job),
            exclude_configured: true,
        });

        orchestrator.run_sources(snapshot, sources).await
    }
}
