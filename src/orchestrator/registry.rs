//! Strategy selection.
use strum::IntoEnumIterator;

use crate::{
    job::Job,
    orchestrator::strategies::{
        create_group_security_update_pull_request::CreateGroupSecurityUpdatePullRequest,
        create_security_update_pull_request::CreateSecurityUpdatePullRequest,
        group_update_all_versions::GroupUpdateAllVersions,
        refresh_group_security_update_pull_request::RefreshGroupSecurityUpdatePullRequest,
        refresh_group_update_pull_request::RefreshGroupUpdatePullRequest,
        refresh_security_update_pull_request::RefreshSecurityUpdatePullRequest,
        refresh_version_update_pull_request::RefreshVersionUpdatePullRequest,
        update_all_versions::UpdateAllVersions,
    },
};

/// Every strategy, declared in priority order. More specific strategies
/// come first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum StrategyKind {
    GroupUpdateAllVersions,
    UpdateAllVersions,
    RefreshGroupUpdatePullRequest,
    RefreshVersionUpdatePullRequest,
    CreateGroupSecurityUpdatePullRequest,
    CreateSecurityUpdatePullRequest,
    RefreshGroupSecurityUpdatePullRequest,
    RefreshSecurityUpdatePullRequest,
}

impl StrategyKind {
    pub fn applies_to(&self, job: &Job) -> bool {
        match self {
            Self::GroupUpdateAllVersions => {
                GroupUpdateAllVersions::applies_to(job)
            }
            Self::UpdateAllVersions => UpdateAllVersions::applies_to(job),
            Self::RefreshGroupUpdatePullRequest => {
                RefreshGroupUpdatePullRequest::applies_to(job)
            }
            Self::RefreshVersionUpdatePullRequest => {
                RefreshVersionUpdatePullRequest::applies_to(job)
            }
            Self::CreateGroupSecurityUpdatePullRequest => {
                CreateGroupSecurityUpdatePullRequest::applies_to(job)
            }
            Self::CreateSecurityUpdatePullRequest => {
                CreateSecurityUpdatePullRequest::applies_to(job)
            }
            Self::RefreshGroupSecurityUpdatePullRequest => {
                RefreshGroupSecurityUpdatePullRequest::applies_to(job)
            }
            Self::RefreshSecurityUpdatePullRequest => {
                RefreshSecurityUpdatePullRequest::applies_to(job)
            }
        }
    }
}

pub struct StrategyRegistry;

impl StrategyRegistry {
    /// The first strategy in priority order that applies to `job`.
    pub fn select(job: &Job) -> Option<StrategyKind> {
        StrategyKind::iter().find(|kind| kind.applies_to(job))
    }

    /// Every strategy that applies to `job`, in priority order.
    pub fn matching(job: &Job) -> Vec<StrategyKind> {
        StrategyKind::iter().filter(|kind| kind.applies_to(job)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::job::{AppliesTo, GroupConfig};

    #[test]
    fn strategies_are_declared_in_priority_order() {
        let kinds = StrategyKind::iter().collect::<Vec<StrategyKind>>();

        assert_eq!(kinds.first(), Some(&StrategyKind::GroupUpdateAllVersions));
        assert_eq!(
            kinds.last(),
            Some(&StrategyKind::RefreshSecurityUpdatePullRequest)
        );
        assert_eq!(kinds.len(), 8);
    }

    #[test]
    fn selects_update_all_versions_for_plain_version_job() {
        let job = Job::builder().id("1").package_manager("cargo").build().unwrap();

        assert_eq!(
            StrategyRegistry::select(&job),
            Some(StrategyKind::UpdateAllVersions)
        );
    }

    #[test]
    fn selects_grouped_strategy_when_version_group_configured() {
        let job = Job::builder()
            .id("1")
            .package_manager("cargo")
            .dependency_groups(vec![GroupConfig::new(
                "all",
                AppliesTo::VersionUpdates,
            )])
            .build()
            .unwrap();

        assert_eq!(
            StrategyRegistry::select(&job),
            Some(StrategyKind::GroupUpdateAllVersions)
        );
    }

    #[test]
    fn security_groups_do_not_select_grouped_version_strategy() {
        let job = Job::builder()
            .id("1")
            .package_manager("cargo")
            .dependency_groups(vec![GroupConfig::new(
                "sec",
                AppliesTo::SecurityUpdates,
            )])
            .build()
            .unwrap();

        assert_eq!(
            StrategyRegistry::select(&job),
            Some(StrategyKind::UpdateAllVersions)
        );
    }

    #[test]
    fn version_job_naming_dependencies_without_refresh_has_no_strategy() {
        let job = Job::builder()
            .id("1")
            .package_manager("cargo")
            .dependencies(vec!["serde".to_string()])
            .build()
            .unwrap();

        assert_eq!(StrategyRegistry::select(&job), None);
        assert!(StrategyRegistry::matching(&job).is_empty());
    }

    #[test]
    fn parses_kind_from_snake_case() {
        let kind: StrategyKind =
            "refresh_group_security_update_pull_request".parse().unwrap();

        assert_eq!(kind, StrategyKind::RefreshGroupSecurityUpdatePullRequest);
        assert_eq!(
            StrategyKind::UpdateAllVersions.to_string(),
            "update_all_versions"
        );
    }
}
