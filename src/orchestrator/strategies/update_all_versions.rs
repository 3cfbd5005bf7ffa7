//! One pull request per outdated dependency.
use log::*;

use crate::{
    Result,
    change::DependencyChange,
    dependency::Dependency,
    job::Job,
    orchestrator::{
        context::{StrategyContext, VersionCheck},
        directory::{DirectoryMerger, HandledPolicy},
    },
    snapshot::DependencySnapshot,
};

pub struct UpdateAllVersions {
    ctx: StrategyContext,
}

impl UpdateAllVersions {
    pub fn applies_to(job: &Job) -> bool {
        !job.is_security()
            && !job.is_refresh()
            && !job.has_named_dependencies()
            && job.version_groups().next().is_none()
    }

    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        update_ungrouped_dependencies(&self.ctx, snapshot).await
    }
}

/// Creates individual pull requests for the unhandled dependencies of every
/// directory.
pub async fn update_ungrouped_dependencies(
    ctx: &StrategyContext,
    snapshot: &mut DependencySnapshot,
) -> Result<Vec<DependencyChange>> {
    let merger = DirectoryMerger::new(&ctx.job, HandledPolicy::Keep);
    let mut submitted = vec![];

    for directory in merger.directories() {
        merger.enter(snapshot, &directory);

        let dependencies = snapshot.ungrouped_dependencies();
        debug!(
            "{} ungrouped dependencies in {directory}",
            dependencies.len()
        );

        for dependency in dependencies {
            if snapshot.is_handled(&dependency.name) {
                continue;
            }

            match check_and_create_pull_request(ctx, snapshot, &dependency)
                .await
            {
                Ok(Some(change)) => submitted.push(change),
                Ok(None) => {}
                Err(e) => {
                    ctx.recover_dependency_error(e, &dependency).await?;
                }
            }
        }
    }

    Ok(submitted)
}

async fn check_and_create_pull_request(
    ctx: &StrategyContext,
    snapshot: &mut DependencySnapshot,
    dependency: &Dependency,
) -> Result<Option<DependencyChange>> {
    info!(
        "checking if {} {} needs updating",
        dependency.name,
        dependency.version().unwrap_or("-")
    );

    snapshot.add_handled_dependencies([&dependency.name]);

    let checker =
        ctx.checker_for(dependency, snapshot.dependency_files(), None)?;

    let latest = match ctx.check_latest_version(checker.as_ref()).await? {
        VersionCheck::AllIgnored => return Ok(None),
        VersionCheck::Latest(latest) => latest,
    };

    if checker.up_to_date().await? {
        info!("no update needed for {}", dependency.name);
        return Ok(None);
    }

    if let Some(latest) = &latest
        && ctx.pull_request_exists_for(snapshot, &dependency.name, latest)
    {
        info!(
            "pull request already exists for {} with latest version {latest}",
            dependency.name
        );
        return Ok(None);
    }

    let Some(scope) = ctx.requirements_to_unlock(checker.as_ref()).await?.scope()
    else {
        info!("no update possible for {}", dependency.name);
        return Ok(None);
    };

    let updated = checker.updated_dependencies(scope).await?;
    let change = ctx.build_change(snapshot.dependency_files(), updated, None)?;

    let reconciliation = ctx.reconcile_create(snapshot, &change);
    let submitted = ctx.submit(snapshot, change, reconciliation).await?;

    if let Some(change) = &submitted {
        snapshot.add_handled_dependencies(change.updated_dependency_names());
    }

    Ok(submitted)
}
