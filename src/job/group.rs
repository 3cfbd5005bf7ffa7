//! Dependency group configuration.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which kind of job a dependency group participates in.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AppliesTo {
    #[default]
    VersionUpdates,
    SecurityUpdates,
}

/// Semver component of a proposed update.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpdateType {
    Major,
    Minor,
    Patch,
}

/// Dependency type filter for group membership.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupDependencyType {
    Production,
    Development,
}

/// Membership rules for a dependency group.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct GroupRules {
    /// Name patterns (`*` wildcards) a dependency must match. Empty means
    /// every dependency matches.
    pub patterns: Vec<String>,
    /// Name patterns that remove a dependency from the group.
    pub exclude_patterns: Vec<String>,
    /// Restricts the group to production or development dependencies
    pub dependency_type: Option<GroupDependencyType>,
    /// Semver update types the group accepts. Empty accepts all.
    pub update_types: Vec<UpdateType>,
}

/// A configured dependency group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub applies_to: AppliesTo,
    #[serde(default)]
    pub rules: GroupRules,
}

impl GroupConfig {
    pub fn new(name: impl Into<String>, applies_to: AppliesTo) -> Self {
        Self {
            name: name.into(),
            applies_to,
            rules: GroupRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: GroupRules) -> Self {
        self.rules = rules;
        self
    }
}
