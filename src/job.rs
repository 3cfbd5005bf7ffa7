//! Job definition: one repository, one or more directories and the update
//! configuration that scopes a single updater run.
//!
//! Jobs are deserialized from JSON using kebab-case keys. A job file may
//! either contain the job object itself or wrap it under a top-level `job`
//! key.
use derive_builder::Builder;
use log::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::{
    dependency::Dependency,
    error::{Result, UpdaterError},
    helpers::{names_match, normalize_directory, wildcard_match},
};

pub mod group;
pub mod policy;
pub mod pull_request;

pub use group::{
    AppliesTo, GroupConfig, GroupDependencyType, GroupRules, UpdateType,
};
pub use policy::{
    AllowedDependencyType, AllowedUpdate, AllowedUpdateType, Cooldown,
    IgnoreCondition, SecurityAdvisory,
};
pub use pull_request::{
    ExistingGroupPullRequest, ExistingPullRequest, PullRequestDependency,
};

/// Directory the job runs in when the source names none.
pub const ROOT_DIRECTORY: &str = "/";

/// Repository location the job targets.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default, rename_all = "kebab-case")]
pub struct JobSource {
    /// Repository name, e.g. "octo-org/website"
    pub repo: String,
    /// Single target directory
    pub directory: Option<String>,
    /// Multiple target directories. Takes precedence over `directory`.
    pub directories: Option<Vec<String>>,
    /// Target branch, defaults to the repository default branch
    pub branch: Option<String>,
}

/// An update job. Immutable for the duration of a run.
#[derive(
    Debug,
    Default,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    JsonSchema,
    Builder,
)]
#[serde(default, rename_all = "kebab-case")]
#[builder(
    default,
    setter(into, strip_option),
    build_fn(private, name = "_build")
)]
pub struct Job {
    /// Unique job id assigned by the scheduler
    pub id: String,
    /// Ecosystem identifier, e.g. "npm_and_yarn" or "bundler"
    pub package_manager: String,
    /// Dependency names this job is scoped to. Present for security and
    /// refresh jobs.
    pub dependencies: Option<Vec<String>>,
    /// Only propose updates that fix a known vulnerability
    pub security_updates_only: bool,
    /// The job refreshes an existing pull request instead of creating new
    /// ones
    pub updating_a_pull_request: bool,
    /// Name of the dependency group whose pull request is being refreshed
    pub dependency_group_to_refresh: Option<String>,
    pub source: JobSource,
    pub dependency_groups: Vec<GroupConfig>,
    pub existing_pull_requests: Vec<ExistingPullRequest>,
    pub existing_group_pull_requests: Vec<ExistingGroupPullRequest>,
    pub ignore_conditions: Vec<IgnoreCondition>,
    pub cooldown: Option<Cooldown>,
    pub security_advisories: Vec<SecurityAdvisory>,
    pub allowed_updates: Vec<AllowedUpdate>,
}

impl JobBuilder {
    pub fn build(&self) -> Result<Job> {
        let job = self._build().map_err(|e| {
            UpdaterError::invalid_config(format!("Failed to build job: {}", e))
        })?;
        job.validate()?;
        Ok(job)
    }

    /// Sets a single target directory.
    pub fn directory(&mut self, directory: impl Into<String>) -> &mut Self {
        let mut source = self.source.clone().unwrap_or_default();
        source.directory = Some(directory.into());
        self.source = Some(source);
        self
    }

    /// Sets multiple target directories.
    pub fn directories<I, S>(&mut self, directories: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut source = self.source.clone().unwrap_or_default();
        source.directories =
            Some(directories.into_iter().map(Into::into).collect());
        self.source = Some(source);
        self
    }
}

impl Job {
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }

    /// Parses a job from JSON, accepting either a bare job object or one
    /// wrapped under a `job` key.
    pub fn from_json(content: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(content)?;

        if let Some(inner) = value.get_mut("job") {
            value = inner.take();
        }

        let job: Job = serde_json::from_value(value)?;
        job.validate()?;

        Ok(job)
    }

    /// Loads and validates a job definition from disk.
    pub async fn load(path: &Path) -> Result<Self> {
        debug!("loading job definition: {}", path.display());
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Rejects job definitions the orchestrator cannot run.
    pub fn validate(&self) -> Result<()> {
        if let Some(directories) = &self.source.directories
            && directories.is_empty()
        {
            return Err(UpdaterError::invalid_config(format!(
                "job {} lists an empty set of source directories",
                self.id
            )));
        }

        for group in self.dependency_groups.iter() {
            if group.name.trim().is_empty() {
                return Err(UpdaterError::invalid_config(format!(
                    "job {} has a dependency group without a name",
                    self.id
                )));
            }
        }

        Ok(())
    }

    /// Normalized, de-duplicated target directories in configuration
    /// order. Always yields at least one directory.
    pub fn directories(&self) -> Vec<String> {
        let configured = match (&self.source.directories, &self.source.directory)
        {
            (Some(list), _) if !list.is_empty() => list.clone(),
            (_, Some(directory)) => vec![directory.clone()],
            _ => vec![],
        };

        let mut directories: Vec<String> = vec![];

        for directory in configured.iter() {
            let normalized = normalize_directory(directory).into_owned();
            if !directories.contains(&normalized) {
                directories.push(normalized);
            }
        }

        if directories.is_empty() {
            directories.push(ROOT_DIRECTORY.to_string());
        }

        directories
    }

    pub fn is_security(&self) -> bool {
        self.security_updates_only
    }

    pub fn is_refresh(&self) -> bool {
        self.updating_a_pull_request
    }

    /// Explicitly named dependencies, empty when the job names none.
    pub fn named_dependencies(&self) -> &[String] {
        self.dependencies.as_deref().unwrap_or_default()
    }

    pub fn has_named_dependencies(&self) -> bool {
        !self.named_dependencies().is_empty()
    }

    pub fn names_dependency(&self, name: &str) -> bool {
        self.named_dependencies()
            .iter()
            .any(|candidate| names_match(candidate, name))
    }

    pub fn version_groups(&self) -> impl Iterator<Item = &GroupConfig> {
        self.groups_applying_to(AppliesTo::VersionUpdates)
    }

    pub fn security_groups(&self) -> impl Iterator<Item = &GroupConfig> {
        self.groups_applying_to(AppliesTo::SecurityUpdates)
    }

    /// Groups that participate in this kind of job.
    pub fn applicable_groups(&self) -> impl Iterator<Item = &GroupConfig> {
        let applies_to = if self.is_security() {
            AppliesTo::SecurityUpdates
        } else {
            AppliesTo::VersionUpdates
        };
        self.groups_applying_to(applies_to)
    }

    fn groups_applying_to(
        &self,
        applies_to: AppliesTo,
    ) -> impl Iterator<Item = &GroupConfig> {
        self.dependency_groups
            .iter()
            .filter(move |g| g.applies_to == applies_to)
    }

    pub fn existing_group_pull_request(
        &self,
        group_name: &str,
    ) -> Option<&ExistingGroupPullRequest> {
        self.existing_group_pull_requests
            .iter()
            .find(|pr| pr.dependency_group_name == group_name)
    }

    /// Security jobs must report ignored dependencies rather than skip them
    /// silently.
    pub fn strict_ignore_reporting(&self) -> bool {
        self.security_updates_only
    }

    /// Whether the update checker for `name` should raise when every
    /// candidate version is ignored.
    pub fn raise_on_ignored(&self, name: &str) -> bool {
        self.strict_ignore_reporting()
            || self
                .ignore_conditions
                .iter()
                .any(|c| wildcard_match(&c.dependency_name, name))
    }

    pub fn ignore_conditions_for(&self, name: &str) -> Vec<IgnoreCondition> {
        self.ignore_conditions
            .iter()
            .filter(|c| wildcard_match(&c.dependency_name, name))
            .cloned()
            .collect()
    }

    pub fn advisories_for(&self, name: &str) -> Vec<SecurityAdvisory> {
        self.security_advisories
            .iter()
            .filter(|a| names_match(&a.dependency_name, name))
            .cloned()
            .collect()
    }

    /// Whether the job configuration allows updating `dependency`.
    ///
    /// Security jobs consider every dependency they name. Version jobs
    /// without explicit rules only update top-level dependencies.
    pub fn allowed_update(&self, dependency: &Dependency) -> bool {
        if self.is_security() {
            return true;
        }

        if self.allowed_updates.is_empty() {
            return dependency.top_level();
        }

        self.allowed_updates.iter().any(|rule| {
            if let Some(pattern) = &rule.dependency_name
                && !wildcard_match(pattern, &dependency.name)
            {
                return false;
            }

            let type_allowed = match rule.dependency_type.unwrap_or_default() {
                AllowedDependencyType::Direct => dependency.top_level(),
                AllowedDependencyType::Indirect => !dependency.top_level(),
                AllowedDependencyType::Production => dependency.production,
                AllowedDependencyType::Development => !dependency.production,
                AllowedDependencyType::All => true,
            };

            if !type_allowed {
                return false;
            }

            match rule.update_type.unwrap_or_default() {
                AllowedUpdateType::All => true,
                AllowedUpdateType::Security => {
                    !self.advisories_for(&dependency.name).is_empty()
                }
            }
        })
    }
}
