//! Update checker collaborator interfaces.
//!
//! An update checker answers questions about one dependency: which version
//! is the latest, whether it is vulnerable, and whether and how an update
//! can be realized. Ecosystems provide implementations through an
//! [`UpdateCheckerFactory`].
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    dependency::{Dependency, DependencyFile},
    job::{Cooldown, IgnoreCondition, SecurityAdvisory},
};

/// How much of a manifest's requirement text may be rewritten to realize
/// an update. Ordered from narrowest to widest.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UnlockScope {
    /// Lockfile-only update, requirements untouched
    None,
    /// The dependency's own requirement may change
    Own,
    /// Requirements of other dependencies may change too
    All,
}

/// Options handed to the factory for every checker it builds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckerOptions {
    /// Return [`crate::UpdaterError::AllVersionsIgnored`] from
    /// `latest_version` when every candidate is ignored
    pub raise_on_ignored: bool,
    pub security_advisories: Vec<SecurityAdvisory>,
    pub ignore_conditions: Vec<IgnoreCondition>,
    pub cooldown: Option<Cooldown>,
    /// Group the dependency is being updated for
    pub dependency_group: Option<String>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UpdateChecker: Send + Sync {
    /// Latest version the configuration allows, or None when unknown.
    async fn latest_version(&self) -> Result<Option<String>>;

    /// Latest version that resolves with the rest of the dependency tree.
    async fn latest_resolvable_version(&self) -> Result<Option<String>>;

    /// Lowest version that fixes every known advisory.
    async fn lowest_security_fix_version(&self) -> Result<Option<String>>;

    async fn up_to_date(&self) -> Result<bool>;

    async fn vulnerable(&self) -> Result<bool>;

    async fn can_update(&self, scope: UnlockScope) -> Result<bool>;

    async fn requirements_unlocked_or_can_be(&self) -> Result<bool>;

    /// Dependencies updated when unlocking with `scope`, including the
    /// checked dependency itself.
    async fn updated_dependencies(
        &self,
        scope: UnlockScope,
    ) -> Result<Vec<Dependency>>;

    /// Names of dependencies that block a security fix.
    async fn conflicting_dependencies(&self) -> Result<Vec<String>>;
}

/// Builds update checkers for dependencies.
#[cfg_attr(test, automock)]
pub trait UpdateCheckerFactory: Send + Sync {
    fn checker_for(
        &self,
        dependency: &Dependency,
        dependency_files: &[DependencyFile],
        options: &CheckerOptions,
    ) -> Result<Box<dyn UpdateChecker>>;
}
