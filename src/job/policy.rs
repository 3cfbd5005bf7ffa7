//! Update policies handed through to update checkers: ignore conditions,
//! cooldown windows, security advisories and allowed updates.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{helpers::wildcard_match, job::UpdateType};

/// Versions or update types a user asked never to be proposed.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct IgnoreCondition {
    pub dependency_name: String,
    pub version_requirement: Option<String>,
    pub update_types: Vec<String>,
    pub source: Option<String>,
}

/// Publish-date exclusion window for freshly released versions.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct Cooldown {
    pub default_days: Option<u32>,
    pub semver_major_days: Option<u32>,
    pub semver_minor_days: Option<u32>,
    pub semver_patch_days: Option<u32>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Cooldown {
    /// Whether the window applies to `name`. An empty include list covers
    /// every dependency; exclude patterns win.
    pub fn applies_to(&self, name: &str) -> bool {
        if self.exclude.iter().any(|p| wildcard_match(p, name)) {
            return false;
        }
        self.include.is_empty()
            || self.include.iter().any(|p| wildcard_match(p, name))
    }

    /// Days a version must have been published before an update of
    /// `kind` may propose it.
    pub fn days_for(&self, kind: UpdateType) -> u32 {
        let specific = match kind {
            UpdateType::Major => self.semver_major_days,
            UpdateType::Minor => self.semver_minor_days,
            UpdateType::Patch => self.semver_patch_days,
        };
        specific.or(self.default_days).unwrap_or(0)
    }
}

/// A vulnerability affecting one dependency.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct SecurityAdvisory {
    pub dependency_name: String,
    pub affected_versions: Vec<String>,
    pub patched_versions: Vec<String>,
    pub unaffected_versions: Vec<String>,
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AllowedDependencyType {
    Direct,
    Indirect,
    Production,
    Development,
    #[default]
    All,
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AllowedUpdateType {
    #[default]
    All,
    Security,
}

/// One `allow` entry of the update configuration.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct AllowedUpdate {
    pub dependency_name: Option<String>,
    pub dependency_type: Option<AllowedDependencyType>,
    pub update_type: Option<AllowedUpdateType>,
}
