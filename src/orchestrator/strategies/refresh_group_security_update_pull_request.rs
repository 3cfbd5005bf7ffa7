use log::*;

use crate::{
    Result,
    change::DependencyChange,
    job::{AppliesTo, Job},
    orchestrator::{
        context::StrategyContext,
        directory::HandledPolicy,
        group::GroupSource,
        strategies::{
            create_group_security_update_pull_request::security_group_name,
            refresh_group_update_pull_request::{
                refresh_group, report_missing_group,
            },
        },
    },
    service::CloseReason,
    snapshot::{DependencyGroup, DependencySnapshot},
};

/// Refreshes a grouped security pull request. Every directory is evaluated
/// against the group independently.
pub struct RefreshGroupSecurityUpdatePullRequest {
    ctx: StrategyContext,
}

impl RefreshGroupSecurityUpdatePullRequest {
    pub fn applies_to(job: &Job) -> bool {
        job.is_security()
            && job.is_refresh()
            && (job.dependency_group_to_refresh.is_some()
                || job.directories().len() > 1)
    }

    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        let (source, group) = match &self.ctx.job.dependency_group_to_refresh {
            Some(name) => {
                let Some(group) = snapshot.group(name).cloned() else {
                    report_missing_group(&self.ctx).await;
                    return Ok(vec![]);
                };
                (GroupSource::Configured(name.clone()), group)
            }
            None => {
                let name = security_group_name(&self.ctx.job);
                (
                    GroupSource::JobDependencies {
                        name: name.clone(),
                        exclude_configured: false,
                    },
                    DependencyGroup::ad_hoc(
                        name,
                        AppliesTo::SecurityUpdates,
                        vec![],
                    ),
                )
            }
        };

        if snapshot.all_job_dependencies().is_empty() {
            let target = self.ctx.refresh_target(snapshot);
            info!("dependencies {:?} were removed", target.names);
            self.ctx
                .close_pull_request(
                    snapshot,
                    &target.names,
                    CloseReason::DependencyRemoved,
                )
                .await?;
            return Ok(vec![]);
        }

        refresh_group(
            &self.ctx,
            snapshot,
            source,
            group,
            HandledPolicy::ResetPerDirectory,
        )
        .await
    }
}
