//! Static dispatch over the update strategies.
use crate::{
    Result,
    change::DependencyChange,
    orchestrator::{
        context::StrategyContext,
        registry::StrategyKind,
        strategies::{
            create_group_security_update_pull_request::CreateGroupSecurityUpdatePullRequest,
            create_security_update_pull_request::CreateSecurityUpdatePullRequest,
            group_update_all_versions::GroupUpdateAllVersions,
            refresh_group_security_update_pull_request::RefreshGroupSecurityUpdatePullRequest,
            refresh_group_update_pull_request::RefreshGroupUpdatePullRequest,
            refresh_security_update_pull_request::RefreshSecurityUpdatePullRequest,
            refresh_version_update_pull_request::RefreshVersionUpdatePullRequest,
            update_all_versions::UpdateAllVersions,
        },
    },
    snapshot::DependencySnapshot,
};

/// A selected strategy bound to the collaborators of the run.
pub enum Strategy {
    GroupUpdateAllVersions(GroupUpdateAllVersions),
    UpdateAllVersions(UpdateAllVersions),
    RefreshGroupUpdatePullRequest(RefreshGroupUpdatePullRequest),
    RefreshVersionUpdatePullRequest(RefreshVersionUpdatePullRequest),
    CreateGroupSecurityUpdatePullRequest(CreateGroupSecurityUpdatePullRequest),
    CreateSecurityUpdatePullRequest(CreateSecurityUpdatePullRequest),
    RefreshGroupSecurityUpdatePullRequest(
        RefreshGroupSecurityUpdatePullRequest,
    ),
    RefreshSecurityUpdatePullRequest(RefreshSecurityUpdatePullRequest),
}

impl Strategy {
    pub fn new(kind: StrategyKind, ctx: StrategyContext) -> Self {
        match kind {
            StrategyKind::GroupUpdateAllVersions => {
                Self::GroupUpdateAllVersions(GroupUpdateAllVersions::new(ctx))
            }
            StrategyKind::UpdateAllVersions => {
                Self::UpdateAllVersions(UpdateAllVersions::new(ctx))
            }
            StrategyKind::RefreshGroupUpdatePullRequest => {
                Self::RefreshGroupUpdatePullRequest(
                    RefreshGroupUpdatePullRequest::new(ctx),
                )
            }
            StrategyKind::RefreshVersionUpdatePullRequest => {
                Self::RefreshVersionUpdatePullRequest(
                    RefreshVersionUpdatePullRequest::new(ctx),
                )
            }
            StrategyKind::CreateGroupSecurityUpdatePullRequest => {
                Self::CreateGroupSecurityUpdatePullRequest(
                    CreateGroupSecurityUpdatePullRequest::new(ctx),
                )
            }
            StrategyKind::CreateSecurityUpdatePullRequest => {
                Self::CreateSecurityUpdatePullRequest(
                    CreateSecurityUpdatePullRequest::new(ctx),
                )
            }
            StrategyKind::RefreshGroupSecurityUpdatePullRequest => {
                Self::RefreshGroupSecurityUpdatePullRequest(
                    RefreshGroupSecurityUpdatePullRequest::new(ctx),
                )
            }
            StrategyKind::RefreshSecurityUpdatePullRequest => {
                Self::RefreshSecurityUpdatePullRequest(
                    RefreshSecurityUpdatePullRequest::new(ctx),
                )
            }
        }
    }

    /// Runs the strategy and returns the changes it submitted.
    pub async fn perform(
        &self,
        snapshot: &mut DependencySnapshot,
    ) -> Result<Vec<DependencyChange>> {
        match self {
            Self::GroupUpdateAllVersions(s) => s.perform(snapshot).await,
            Self::UpdateAllVersions(s) => s.perform(snapshot).await,
            Self::RefreshGroupUpdatePullRequest(s) => s.perform(snapshot).await,
            Self::RefreshVersionUpdatePullRequest(s) => {
                s.perform(snapshot).await
            }
            Self::CreateGroupSecurityUpdatePullRequest(s) => {
                s.perform(snapshot).await
            }
            Self::CreateSecurityUpdatePullRequest(s) => {
                s.perform(snapshot).await
            }
            Self::RefreshGroupSecurityUpdatePullRequest(s) => {
                s.perform(snapshot).await
            }
            Self::RefreshSecurityUpdatePullRequest(s) => {
                s.perform(snapshot).await
            }
        }
    }
}
