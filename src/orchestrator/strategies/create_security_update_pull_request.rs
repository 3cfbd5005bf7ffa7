//! Individual security updates for the dependencies a job names.
use log::*;

use crate::{
    Result,
    change::DependencyChange,
    dependency::Dependency,
    job::Job,
    matcher::Reconciliation,
    orchestrator::context::StrategyContext,
    snapshot::DependencySnapshot,
};

pub struct CreateSecurityUpdatePullRequest {
    ctx: StrategyContext,
}

impl CreateSecurityUpdatePullRequest {
    pub fn applies_to(job: &Job) -> bool {
        job.is_security()
            && !job.is_refresh()
            && !super::create_group_security_update_pull_request::is_grouped(
                job,
            )
    }

    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        let dependencies = snapshot.all_job_dependencies();

        if dependencies.is_empty() {
            self.ctx.record_security_update_dependency_not_found().await;
            return Ok(vec![]);
        }

        let mut submitted = vec![];

        for dependency in dependencies {
            if snapshot.is_handled(&dependency.name) {
                continue;
            }

            snapshot.set_current_directory(&dependency.directory);

            match self.check_and_create_pull_request(snapshot, &dependency).await
            {
                Ok(Some(change)) => submitted.push(change),
                Ok(None) => {}
                Err(e) => {
                    self.ctx.recover_dependency_error(e, &dependency).await?
                }
            }
        }

        Ok(submitted)
    }

    async fn check_and_create_pull_request(
        &self,
        snapshot: &mut DependencySnapshot,
        dependency: &Dependency,
    ) -> Result<Option<DependencyChange>> {
        let ctx = &self.ctx;

        info!(
            "checking if {} {} needs a security update",
            dependency.name,
            dependency.version().unwrap_or("-")
        );

        snapshot.add_handled_dependencies([&dependency.name]);

        let checker =
            ctx.checker_for(dependency, snapshot.dependency_files(), None)?;

        // All-ignored is returned as an error for security jobs
        ctx.check_latest_version(checker.as_ref()).await?;

        if !checker.vulnerable().await? {
            ctx.record_security_update_not_needed(dependency).await;
            return Ok(None);
        }

        if checker.up_to_date().await? {
            ctx.record_security_update_not_possible(dependency, checker.as_ref())
                .await;
            return Ok(None);
        }

        let Some(scope) = ctx.requirements_to_unlock(checker.as_ref()).await?.scope()
        else {
            ctx.record_security_update_not_possible(dependency, checker.as_ref())
                .await;
            return Ok(None);
        };

        let updated = checker.updated_dependencies(scope).await?;
        let change =
            ctx.build_change(snapshot.dependency_files(), updated, None)?;

        let reconciliation = ctx.reconcile_create(snapshot, &change);

        if reconciliation == Reconciliation::AlreadyExists {
            ctx.record_pull_request_exists_for_security_update(&change)
                .await;
            return Ok(None);
        }

        let submitted = ctx.submit(snapshot, change, reconciliation).await?;

        if let Some(change) = &submitted {
            snapshot.add_handled_dependencies(change.updated_dependency_names());
        }

        Ok(submitted)
    }
}
