//! Grouped updates: skipping groups that already have an open pull
//! request, compiling one change per remaining group and keeping grouped
//! dependencies out of individual processing.
use log::*;

use crate::{
    Result,
    change::DependencyChange,
    dependency::Dependency,
    job::AppliesTo,
    orchestrator::{
        batch::GroupChangeBatch,
        context::{StrategyContext, VersionCheck},
        directory::{DirectoryMerger, HandledPolicy},
    },
    matcher::Reconciliation,
    snapshot::{DependencyGroup, DependencySnapshot, HandledDependencies},
};

/// Where the members of a group come from in each directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSource {
    /// A configured group, materialized per directory. Security jobs only
    /// consider the members the job names.
    Configured(String),
    /// The dependencies named by the job. With `exclude_configured`,
    /// dependencies claimed by a configured group are left out.
    JobDependencies {
        name: String,
        exclude_configured: bool,
    },
}

impl GroupSource {
    pub fn name(&self) -> &str {
        match self {
            Self::Configured(name) => name,
            Self::JobDependencies { name, .. } => name,
        }
    }

    /// Group name carried by the resulting change.
    fn change_group(&self) -> Option<String> {
        match self {
            Self::Configured(name) => Some(name.clone()),
            Self::JobDependencies { .. } => None,
        }
    }
}

/// The result of compiling one group across every directory.
#[derive(Debug, Default, Clone)]
pub struct GroupCompilation {
    pub change: DependencyChange,
    /// Members turned away by the group's update-type rules
    pub declined: Vec<String>,
    /// Members found up to date or no longer vulnerable
    pub up_to_date: usize,
    /// Members whose update could not be realized
    pub not_possible: usize,
}

pub struct GroupOrchestrator<'a> {
    ctx: &'a StrategyContext,
    policy: HandledPolicy,
}

impl<'a> GroupOrchestrator<'a> {
    pub fn new(ctx: &'a StrategyContext, policy: HandledPolicy) -> Self {
        Self { ctx, policy }
    }

    /// Runs both phases for the groups of this kind of job and returns the
    /// changes submitted.
    pub async fn run(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        let remaining = self.prescan(snapshot);

        self.run_sources(
            snapshot,
            remaining.into_iter().map(GroupSource::Configured).collect(),
        )
        .await
    }

    /// Marks the dependencies of every group that already has an open pull
    /// request as handled. Returns the names of the groups left to compute.
    pub fn prescan(&self, snapshot: &mut DependencySnapshot) -> Vec<String> {
        let names = snapshot
            .groups()
            .iter()
            .map(|g| g.name.clone())
            .collect::<Vec<String>>();

        let mut remaining = vec![];

        for name in names {
            let Some(pr) = self.ctx.job.existing_group_pull_request(&name)
            else {
                remaining.push(name);
                continue;
            };

            info!("detected existing pull request for group {name}, skipping");

            snapshot.add_handled_dependencies(pr.dependency_names());

            let members =
                self.members(snapshot, &GroupSource::Configured(name.clone()));
            snapshot.add_handled_dependencies(members);
        }

        remaining
    }

    /// Computes and submits one change per source. Members are marked
    /// handled whether or not the computation succeeds.
    pub async fn run_sources(
        &self,
        snapshot: &mut DependencySnapshot,
        sources: Vec<GroupSource>,
    ) -> Result<Vec<DependencyChange>> {
        let mut submitted = vec![];

        for source in sources {
            let members = self.members(snapshot, &source);
            let group = self.reporting_group(snapshot, &source);

            if members.is_empty() {
                debug!("group {} has no members, skipping", source.name());
                continue;
            }

            info!("starting update for group {}", source.name());

            let compilation = match self.compile(snapshot, &source).await {
                Ok(compilation) => compilation,
                Err(e) => {
                    snapshot.add_handled_dependencies(&members);
                    self.ctx.recover_job_error(e, Some(&group)).await?;
                    continue;
                }
            };

            let declined = &compilation.declined;
            snapshot.add_handled_dependencies(
                members
                    .iter()
                    .filter(|m| !declined.contains(&m.to_ascii_lowercase())),
            );

            let change = compilation.change;

            if change.is_empty() {
                info!("nothing to update for group {}", source.name());
                continue;
            }

            let reconciliation = self.ctx.reconcile_create(snapshot, &change);

            if reconciliation == Reconciliation::AlreadyExists
                && self.ctx.job.is_security()
            {
                self.ctx
                    .record_pull_request_exists_for_security_update(&change)
                    .await;
            }

            match self.ctx.submit(snapshot, change, reconciliation).await {
                Ok(Some(change)) => submitted.push(change),
                Ok(None) => {}
                Err(e) => self.ctx.recover_job_error(e, Some(&group)).await?,
            }
        }

        Ok(submitted)
    }

    /// Compiles the change for `source` across every directory.
    pub async fn compile(
        &self,
        snapshot: &mut DependencySnapshot,
        source: &GroupSource,
    ) -> Result<GroupCompilation> {
        let original = snapshot.current_directory().to_string();
        let handled_before = snapshot.handled_dependencies().clone();
        let independent = HandledDependencies::new();

        let mut merger = DirectoryMerger::new(&self.ctx.job, self.policy);
        let mut compilation = GroupCompilation::default();

        for directory in merger.directories() {
            merger.enter(snapshot, &directory);

            let Some(group) = self.group_in_directory(snapshot, source) else {
                continue;
            };

            let skip = match merger.policy() {
                HandledPolicy::Keep => &handled_before,
                HandledPolicy::ResetPerDirectory => &independent,
            };

            let change = self
                .compile_directory(snapshot, source, &group, skip, &mut compilation)
                .await?;
            merger.add(change);
        }

        snapshot.set_current_directory(&original);

        compilation.change = merger.finish().with_group(source.change_group());
        Ok(compilation)
    }

    async fn compile_directory(
        &self,
        snapshot: &mut DependencySnapshot,
        source: &GroupSource,
        group: &DependencyGroup,
        skip: &HandledDependencies,
        compilation: &mut GroupCompilation,
    ) -> Result<DependencyChange> {
        let mut batch = GroupChangeBatch::new(snapshot.dependency_files());

        for dependency in group.dependencies.iter() {
            if skip.contains(&dependency.name) || batch.updates(&dependency.name)
            {
                debug!("{} already handled, skipping", dependency.name);
                continue;
            }

            if let Err(e) = self
                .compile_member(
                    snapshot,
                    source,
                    group,
                    dependency,
                    &mut batch,
                    compilation,
                )
                .await
            {
                snapshot.add_handled_dependencies([&dependency.name]);
                self.ctx.recover_dependency_error(e, dependency).await?;
            }
        }

        compilation.declined.extend(batch.declined());

        Ok(batch.into_change(source.change_group()))
    }

    async fn compile_member(
        &self,
        snapshot: &mut DependencySnapshot,
        source: &GroupSource,
        group: &DependencyGroup,
        dependency: &Dependency,
        batch: &mut GroupChangeBatch,
        compilation: &mut GroupCompilation,
    ) -> Result<()> {
        let job = &self.ctx.job;
        let reporting = job.is_security() && !job.is_refresh();

        info!(
            "checking if {} {} needs updating in group {}",
            dependency.name,
            dependency.version().unwrap_or("-"),
            group.name
        );

        let checker =
            self.ctx
                .checker_for(dependency, batch.current_files(), Some(group))?;

        let latest = match self.ctx.check_latest_version(checker.as_ref()).await?
        {
            VersionCheck::AllIgnored => {
                snapshot.add_handled_dependencies([&dependency.name]);
                return Ok(());
            }
            VersionCheck::Latest(latest) => latest,
        };

        if let Some(latest) = &latest
            && !group.allows_update(dependency, latest)
        {
            info!(
                "group {} does not allow updating {} to {latest}",
                group.name, dependency.name
            );
            batch.decline(&dependency.name);
            return Ok(());
        }

        snapshot.add_handled_dependencies([&dependency.name]);

        if job.is_security() && !checker.vulnerable().await? {
            compilation.up_to_date += 1;
            if reporting {
                self.ctx.record_security_update_not_needed(dependency).await;
            }
            return Ok(());
        }

        if checker.up_to_date().await? {
            info!("no update needed for {}", dependency.name);
            compilation.up_to_date += 1;
            if reporting {
                self.ctx
                    .record_security_update_not_possible(
                        dependency,
                        checker.as_ref(),
                    )
                    .await;
            }
            return Ok(());
        }

        let plan = self.ctx.requirements_to_unlock(checker.as_ref()).await?;

        let Some(scope) = plan.scope() else {
            info!("no update possible for {}", dependency.name);
            compilation.not_possible += 1;
            if reporting {
                self.ctx
                    .record_security_update_not_possible(
                        dependency,
                        checker.as_ref(),
                    )
                    .await;
            }
            return Ok(());
        };

        let updated = checker.updated_dependencies(scope).await?;

        let change = self.ctx.build_change(
            batch.current_files(),
            updated,
            source.change_group(),
        )?;

        batch.merge(change);

        Ok(())
    }

    /// The group `source` describes, materialized for the current
    /// directory.
    pub fn group_in_directory(
        &self,
        snapshot: &DependencySnapshot,
        source: &GroupSource,
    ) -> Option<DependencyGroup> {
        let job = &self.ctx.job;

        match source {
            GroupSource::Configured(name) => {
                let mut group = snapshot.group(name)?.clone();

                if job.is_security() && job.has_named_dependencies() {
                    group.dependencies.retain(|d| job.names_dependency(&d.name));
                }

                Some(group)
            }
            GroupSource::JobDependencies {
                name,
                exclude_configured,
            } => {
                let configured = snapshot.groups();

                let dependencies = snapshot
                    .job_dependencies()
                    .into_iter()
                    .filter(|d| {
                        !exclude_configured
                            || !configured.iter().any(|g| g.contains(&d.name))
                    })
                    .collect();

                Some(DependencyGroup::ad_hoc(
                    name.clone(),
                    applies_to(job.is_security()),
                    dependencies,
                ))
            }
        }
    }

    /// Names of every member of `source` across all directories. Leaves
    /// the snapshot on its current directory.
    pub fn members(
        &self,
        snapshot: &mut DependencySnapshot,
        source: &GroupSource,
    ) -> Vec<String> {
        let original = snapshot.current_directory().to_string();
        let mut members: Vec<String> = vec![];

        for directory in self.ctx.job.directories() {
            snapshot.set_current_directory(&directory);

            if let Some(group) = self.group_in_directory(snapshot, source) {
                for name in group.member_names() {
                    if !members.iter().any(|m| m.eq_ignore_ascii_case(&name)) {
                        members.push(name);
                    }
                }
            }
        }

        snapshot.set_current_directory(&original);

        members
    }

    fn reporting_group(
        &self,
        snapshot: &DependencySnapshot,
        source: &GroupSource,
    ) -> DependencyGroup {
        match source {
            GroupSource::Configured(name) => snapshot
                .group(name)
                .cloned()
                .unwrap_or_else(|| {
                    DependencyGroup::ad_hoc(
                        name.clone(),
                        applies_to(self.ctx.job.is_security()),
                        vec![],
                    )
                }),
            GroupSource::JobDependencies { name, .. } => DependencyGroup::ad_hoc(
                name.clone(),
                applies_to(self.ctx.job.is_security()),
                vec![],
            ),
        }
    }
}

fn applies_to(security: bool) -> AppliesTo {
    if security {
        AppliesTo::SecurityUpdates
    } else {
        AppliesTo::VersionUpdates
    }
}
