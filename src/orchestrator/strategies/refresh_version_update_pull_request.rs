//! Refreshes an open pull request for one dependency (or a dependency and
//! the dependencies it pulls along), typically after a rebase.
use log::*;
use std::collections::BTreeSet;

use crate::{
    Result,
    change::DependencyChange,
    dependency::Dependency,
    helpers::name_key,
    job::Job,
    matcher::{Reconciliation, RefreshTarget},
    orchestrator::context::{StrategyContext, VersionCheck},
    service::CloseReason,
    snapshot::DependencySnapshot,
};

pub struct RefreshVersionUpdatePullRequest {
    ctx: StrategyContext,
}

impl RefreshVersionUpdatePullRequest {
    pub fn applies_to(job: &Job) -> bool {
        !job.is_security()
            && job.is_refresh()
            && job.dependency_group_to_refresh.is_none()
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

/// Shared by the version and security refresh strategies. Closes the pull
/// request when a dependency it covers is gone, otherwise re-checks the
/// lead dependency and updates, replaces or closes the pull request.
pub async fn refresh_pull_request(
    ctx: &StrategyContext,
    snapshot: &mut DependencySnapshot,
) -> Result<Vec<DependencyChange>> {
    let target = ctx.refresh_target(snapshot);
    let found = snapshot.all_job_dependencies();

    let named = ctx
        .job
        .named_dependencies()
        .iter()
        .map(|n| name_key(n))
        .collect::<BTreeSet<String>>();
    let present = found
        .iter()
        .map(|d| name_key(&d.name))
        .collect::<BTreeSet<String>>();

    let Some(lead) = found.first().cloned() else {
        info!("dependencies {:?} were removed", target.names);
        ctx.close_pull_request(snapshot, &target.names, CloseReason::DependencyRemoved)
            .await?;
        return Ok(vec![]);
    };

    if named != present {
        info!("some of the dependencies {:?} were removed", target.names);
        ctx.close_pull_request(snapshot, &target.names, CloseReason::DependencyRemoved)
            .await?;
        return Ok(vec![]);
    }

    snapshot.set_current_directory(&lead.directory);

    match refresh_dependency(ctx, snapshot, &lead, &target).await {
        Ok(submitted) => Ok(submitted.into_iter().collect()),
        Err(e) => {
            ctx.recover_dependency_error(e, &lead).await?;
            Ok(vec![])
        }
    }
}

async fn refresh_dependency(
    ctx: &StrategyContext,
    snapshot: &mut DependencySnapshot,
    lead: &Dependency,
    target: &RefreshTarget,
) -> Result<Option<DependencyChange>> {
    info!(
        "checking if {} {} needs updating for the existing pull request",
        lead.name,
        lead.version().unwrap_or("-")
    );

    snapshot.add_handled_dependencies([&lead.name]);

    let checker = ctx.checker_for(lead, snapshot.dependency_files(), None)?;

    if ctx.check_latest_version(checker.as_ref()).await?
        == VersionCheck::AllIgnored
    {
        return Ok(None);
    }

    let resolved = if ctx.job.is_security() {
        !checker.vulnerable().await? || checker.up_to_date().await?
    } else {
        checker.up_to_date().await?
    };

    if resolved {
        info!("{} no longer needs updating", lead.name);
        ctx.close_pull_request(snapshot, &target.names, CloseReason::UpToDate)
            .await?;
        return Ok(None);
    }

    let Some(scope) = ctx.requirements_to_unlock(checker.as_ref()).await?.scope()
    else {
        info!("update for {} is no longer possible", lead.name);
        ctx.close_pull_request(
            snapshot,
            &target.names,
            CloseReason::UpdateNoLongerPossible,
        )
        .await?;
        return Ok(None);
    };

    let updated = checker.updated_dependencies(scope).await?;
    let change = ctx.build_change(snapshot.dependency_files(), updated, None)?;

    let reconciliation = ctx.reconcile_refresh(snapshot, &change, target);

    if reconciliation == Reconciliation::Nothing {
        ctx.close_pull_request(
            snapshot,
            &target.names,
            CloseReason::UpdateNoLongerPossible,
        )
        .await?;
        return Ok(None);
    }

    ctx.submit(snapshot, change, reconciliation).await
}
