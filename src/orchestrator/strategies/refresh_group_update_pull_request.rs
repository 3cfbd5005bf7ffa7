//! Refreshes the open pull request of a dependency group.
use log::*;

use crate::{
    Result, UpdaterError,
    change::DependencyChange,
    job::{AppliesTo, Job},
    matcher::Reconciliation,
    orchestrator::{
        context::StrategyContext,
        directory::HandledPolicy,
        group::{GroupOrchestrator, GroupSource},
    },
    service::CloseReason,
    snapshot::{DependencyGroup, DependencySnapshot},
};

pub struct RefreshGroupUpdatePullRequest {
    ctx: StrategyContext,
}

impl RefreshGroupUpdatePullRequest {
    pub fn applies_to(job: &Job) -> bool {
        !job.is_security()
            && job.is_refresh()
            && job.dependency_group_to_refresh.is_some()
    }

    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        let Some(group) = snapshot.job_group().cloned() else {
            report_missing_group(&self.ctx).await;
            return Ok(vec![]);
        };

        refresh_group(
            &self.ctx,
            snapshot,
            GroupSource::Configured(group.name.clone()),
            group,
            HandledPolicy::Keep,
        )
        .await
    }
}

/// Reports that the group named by the job is no longer configured.
pub async fn report_missing_group(ctx: &StrategyContext) {
    let name = ctx
        .job
        .dependency_group_to_refresh
        .clone()
        .unwrap_or_default();

    error!("dependency group {name} is not configured, skipping refresh");

    ctx.capture_exception(&UpdaterError::GroupNotFound(name)).await;
}

/// Recompiles the group behind `source` and updates, replaces or closes
/// its open pull request.
pub async fn refresh_group(
    ctx: &StrategyContext,
    snapshot: &mut DependencySnapshot,
    source: GroupSource,
    group: DependencyGroup,
    policy: HandledPolicy,
) -> Result<Vec<DependencyChange>> {
    let target = ctx.refresh_target(snapshot);
    let orchestrator = GroupOrchestrator::new(ctx, policy);

    if orchestrator.members(snapshot, &source).is_empty() {
        info!("group {} no longer has any dependencies", group.name);
        ctx.close_pull_request(
            snapshot,
            &target.names,
            CloseReason::DependencyGroupEmpty,
        )
        .await?;
        return Ok(vec![]);
    }

    let compilation = match orchestrator.compile(snapshot, &source).await {
        Ok(compilation) => compilation,
        Err(e) => {
            ctx.recover_job_error(e, Some(&group)).await?;
            return Ok(vec![]);
        }
    };

    let change = compilation.change;

    if change.is_empty() {
        let reason = if group.applies_to == AppliesTo::SecurityUpdates
            && compilation.not_possible == 0
        {
            CloseReason::UpToDate
        } else {
            CloseReason::UpdateNoLongerPossible
        };

        info!("nothing to update for group {}", group.name);
        ctx.close_pull_request(snapshot, &target.names, reason).await?;
        return Ok(vec![]);
    }

    let reconciliation = ctx.reconcile_refresh(snapshot, &change, &target);

    if reconciliation == Reconciliation::AlreadyExists {
        info!("pull request for group {} is up to date", group.name);
    }

    match ctx.submit(snapshot, change, reconciliation).await {
        Ok(submitted) => Ok(submitted.into_iter().collect()),
        Err(e) => {
            ctx.recover_job_error(e, Some(&group)).await?;
            Ok(vec![])
        }
    }
}
