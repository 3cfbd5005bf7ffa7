//! Building blocks shared by the update strategies.
use color_eyre::eyre::eyre;
use log::*;
use serde_json::json;

use crate::{
    Result, UpdaterError,
    change::DependencyChange,
    checker::{CheckerOptions, UpdateChecker},
    dependency::{Dependency, DependencyFile},
    matcher::{
        PullRequestMatcher, PullRequestSignature, Reconciliation, RefreshTarget,
    },
    orchestrator::context::{StrategyContext, VersionCheck},
    service::{CloseReason, JobError},
    snapshot::{DependencyGroup, DependencySnapshot},
    unlock::{RequirementsUnlockPlanner, UnlockPlan},
};

impl StrategyContext {
    pub fn checker_for(
        &self,
        dependency: &Dependency,
        dependency_files: &[DependencyFile],
        group: Option<&DependencyGroup>,
    ) -> Result<Box<dyn UpdateChecker>> {
        let options = CheckerOptions {
            raise_on_ignored: self.job.raise_on_ignored(&dependency.name),
            security_advisories: self.job.advisories_for(&dependency.name),
            ignore_conditions: self.job.ignore_conditions_for(&dependency.name),
            cooldown: self.job.cooldown.clone(),
            dependency_group: group
                .filter(|g| !g.ad_hoc)
                .map(|g| g.name.clone()),
        };

        self.checkers
            .checker_for(dependency, dependency_files, &options)
    }

    /// Asks `checker` for the latest version. An all-ignored outcome is an
    /// error only when the job requests strict reporting.
    pub async fn check_latest_version(
        &self,
        checker: &dyn UpdateChecker,
    ) -> Result<VersionCheck> {
        match checker.latest_version().await {
            Ok(latest) => Ok(VersionCheck::Latest(latest)),
            Err(UpdaterError::AllVersionsIgnored { dependency }) => {
                info!("all updates for {dependency} were ignored");

                if self.job.strict_ignore_reporting() {
                    return Err(UpdaterError::all_versions_ignored(dependency));
                }

                Ok(VersionCheck::AllIgnored)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn requirements_to_unlock(
        &self,
        checker: &dyn UpdateChecker,
    ) -> Result<UnlockPlan> {
        RequirementsUnlockPlanner::plan(checker).await
    }

    /// Builds the change for `updated_dependencies`, dropping entries whose
    /// version did not move.
    pub fn build_change(
        &self,
        dependency_files: &[DependencyFile],
        updated_dependencies: Vec<Dependency>,
        group: Option<String>,
    ) -> Result<DependencyChange> {
        let updated = updated_dependencies
            .into_iter()
            .filter(Dependency::is_update)
            .collect::<Vec<Dependency>>();

        if updated.is_empty() {
            return Ok(DependencyChange::default().with_group(group));
        }

        let change = self.change_builder.build(
            &self.job,
            dependency_files,
            &updated,
            group.clone(),
        )?;

        if change.is_empty() {
            let names = updated
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<&str>>()
                .join(", ");
            return Err(UpdaterError::Other(eyre!(
                "update checker and change builder do not agree on updated dependencies: {names}"
            )));
        }

        Ok(change.with_group(group))
    }

    pub fn reconcile_create(
        &self,
        snapshot: &DependencySnapshot,
        change: &DependencyChange,
    ) -> Reconciliation {
        PullRequestMatcher::new(&self.job, snapshot.created_pull_requests())
            .reconcile_create(change)
    }

    pub fn reconcile_refresh(
        &self,
        snapshot: &DependencySnapshot,
        change: &DependencyChange,
        target: &RefreshTarget,
    ) -> Reconciliation {
        PullRequestMatcher::new(&self.job, snapshot.created_pull_requests())
            .reconcile_refresh(change, target)
    }

    pub fn refresh_target(&self, snapshot: &DependencySnapshot) -> RefreshTarget {
        PullRequestMatcher::new(&self.job, snapshot.created_pull_requests())
            .refresh_target()
    }

    pub fn pull_request_exists_for(
        &self,
        snapshot: &DependencySnapshot,
        name: &str,
        version: &str,
    ) -> bool {
        PullRequestMatcher::new(&self.job, snapshot.created_pull_requests())
            .pull_request_exists_for(name, version)
    }

    pub async fn create_pull_request(
        &self,
        snapshot: &mut DependencySnapshot,
        change: &DependencyChange,
    ) -> Result<()> {
        self.service
            .create_pull_request(change, snapshot.base_commit_sha())
            .await?;

        snapshot
            .created_pull_requests_mut()
            .record_submitted(PullRequestSignature::of(
                &change.updated_dependencies,
            ));

        Ok(())
    }

    pub async fn update_pull_request(
        &self,
        snapshot: &mut DependencySnapshot,
        change: &DependencyChange,
    ) -> Result<()> {
        self.service
            .update_pull_request(change, snapshot.base_commit_sha())
            .await?;

        snapshot
            .created_pull_requests_mut()
            .record_submitted(PullRequestSignature::of(
                &change.updated_dependencies,
            ));

        Ok(())
    }

    /// Closes the pull request for `dependency_names` unless this run
    /// already closed it.
    pub async fn close_pull_request(
        &self,
        snapshot: &mut DependencySnapshot,
        dependency_names: &[String],
        reason: CloseReason,
    ) -> Result<()> {
        if snapshot.created_pull_requests().is_closed(dependency_names) {
            debug!("pull request already closed: {dependency_names:?}");
            return Ok(());
        }

        self.service
            .close_pull_request(dependency_names, reason)
            .await?;

        snapshot
            .created_pull_requests_mut()
            .record_closed(dependency_names);

        Ok(())
    }

    /// Carries out a reconciliation outcome. Returns the change when a pull
    /// request was created or updated.
    pub async fn submit(
        &self,
        snapshot: &mut DependencySnapshot,
        change: DependencyChange,
        reconciliation: Reconciliation,
    ) -> Result<Option<DependencyChange>> {
        match reconciliation {
            Reconciliation::Nothing => Ok(None),
            Reconciliation::AlreadyExists => {
                info!(
                    "pull request already exists for: {}",
                    change.updated_dependency_names().join(", ")
                );
                Ok(None)
            }
            Reconciliation::Create => {
                self.create_pull_request(snapshot, &change).await?;
                Ok(Some(change))
            }
            Reconciliation::Update => {
                self.update_pull_request(snapshot, &change).await?;
                Ok(Some(change))
            }
            Reconciliation::Replace { superseded } => {
                self.close_pull_request(
                    snapshot,
                    &superseded,
                    CloseReason::DependenciesChanged,
                )
                .await?;
                self.create_pull_request(snapshot, &change).await?;
                Ok(Some(change))
            }
        }
    }

    /// Handles an error raised while updating `dependency`. Only the
    /// all-versions-ignored signal of a strict job is returned.
    pub async fn recover_dependency_error(
        &self,
        error: UpdaterError,
        dependency: &Dependency,
    ) -> Result<()> {
        match error {
            UpdaterError::AllVersionsIgnored { .. }
                if self.job.strict_ignore_reporting() =>
            {
                Err(error)
            }
            UpdaterError::AllVersionsIgnored { .. } => {
                info!("all updates for {} were ignored", dependency.name);
                Ok(())
            }
            UpdaterError::InconsistentRegistryResponse(_) => {
                self.error_handler.log_dependency_error(
                    dependency,
                    &error,
                    "inconsistent_registry_response",
                    &error.to_string(),
                );
                Ok(())
            }
            _ => {
                self.error_handler
                    .handle_dependency_error(&error, dependency)
                    .await;
                Ok(())
            }
        }
    }

    /// Reports a job-level error. The strict all-versions-ignored signal is
    /// returned instead.
    pub async fn recover_job_error(
        &self,
        error: UpdaterError,
        group: Option<&DependencyGroup>,
    ) -> Result<()> {
        if matches!(error, UpdaterError::AllVersionsIgnored { .. })
            && self.job.strict_ignore_reporting()
        {
            return Err(error);
        }

        self.error_handler.handle_job_error(&error, group).await;
        Ok(())
    }

    /// Reports a configuration defect to the exception tracker.
    pub async fn capture_exception(&self, error: &UpdaterError) {
        if let Err(e) = self.service.capture_exception(error, &self.job).await
        {
            warn!("failed to capture exception: {e}");
        }
    }

    pub async fn record_security_update_dependency_not_found(&self) {
        warn!(
            "none of the dependencies {:?} were found",
            self.job.named_dependencies()
        );
        self.error_handler
            .record(JobError::new(
                "security_update_dependency_not_found",
                json!({ "dependency-names": self.job.named_dependencies() }),
            ))
            .await;
    }

    pub async fn record_security_update_not_needed(
        &self,
        dependency: &Dependency,
    ) {
        info!("{} is no longer vulnerable", dependency.name);
        self.error_handler
            .record(JobError::new(
                "security_update_not_needed",
                json!({ "dependency-name": dependency.name }),
            ))
            .await;
    }

    pub async fn record_security_update_not_possible(
        &self,
        dependency: &Dependency,
        checker: &dyn UpdateChecker,
    ) {
        let latest_resolvable_version = checker
            .latest_resolvable_version()
            .await
            .ok()
            .flatten();
        let lowest_non_vulnerable_version = checker
            .lowest_security_fix_version()
            .await
            .ok()
            .flatten();
        let conflicting_dependencies =
            checker.conflicting_dependencies().await.unwrap_or_default();

        info!(
            "security update not possible for {} (latest resolvable: {:?})",
            dependency.name, latest_resolvable_version
        );

        self.error_handler
            .record(JobError::new(
                "security_update_not_possible",
                json!({
                    "dependency-name": dependency.name,
                    "latest-resolvable-version": latest_resolvable_version,
                    "lowest-non-vulnerable-version": lowest_non_vulnerable_version,
                    "conflicting-dependencies": conflicting_dependencies,
                }),
            ))
            .await;
    }

    pub async fn record_pull_request_exists_for_security_update(
        &self,
        change: &DependencyChange,
    ) {
        let updated = change
            .updated_dependencies
            .iter()
            .map(|d| {
                json!({
                    "dependency-name": d.name,
                    "dependency-version": d.version,
                    "dependency-removed": d.removed,
                })
            })
            .collect::<Vec<_>>();

        self.error_handler
            .record(JobError::new(
                "pull_request_exists_for_security_update",
                json!({ "updated-dependencies": updated }),
            ))
            .await;
    }
}
