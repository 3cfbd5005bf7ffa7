//! Update checker answering from registry data in the workspace fixture.
//!
//! Ignore conditions and security advisories come from the job through
//! [`CheckerOptions`], so the same fixture serves version and security
//! jobs alike.
use async_trait::async_trait;
use log::*;
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{
    Result, UpdaterError,
    checker::{CheckerOptions, UnlockScope, UpdateChecker, UpdateCheckerFactory},
    dependency::{Dependency, DependencyBuilder, DependencyFile, Requirement},
    helpers::{names_match, parse_version},
    job::{IgnoreCondition, SecurityAdvisory},
    snapshot::group::update_type,
};

/// A dependency pulled along by an update.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransitiveUpdate {
    pub name: String,
    pub version: String,
    pub previous_version: String,
}

/// What the registry knows about one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RegistryEntry {
    pub name: String,
    /// Every published version
    pub versions: Vec<String>,
    /// Narrowest unlock the update needs
    pub unlock: UnlockScope,
    /// Whether the update resolves at all
    pub resolvable: bool,
    /// Requirements are pinned and cannot be rewritten
    pub requirements_locked: bool,
    /// Dependencies that move along with this one
    pub moves: Vec<TransitiveUpdate>,
    pub conflicting_dependencies: Vec<String>,
    /// Days since each version was published. Versions missing here count
    /// as old enough for any cooldown.
    pub age_days: BTreeMap<String, u32>,
}

impl Default for RegistryEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            versions: vec![],
            unlock: UnlockScope::Own,
            resolvable: true,
            requirements_locked: false,
            moves: vec![],
            conflicting_dependencies: vec![],
            age_days: BTreeMap::new(),
        }
    }
}

pub struct StaticCheckerFactory {
    registry: Vec<RegistryEntry>,
}

impl StaticCheckerFactory {
    pub fn new(registry: Vec<RegistryEntry>) -> Self {
        Self { registry }
    }
}

impl UpdateCheckerFactory for StaticCheckerFactory {
    fn checker_for(
        &self,
        dependency: &Dependency,
        _dependency_files: &[DependencyFile],
        options: &CheckerOptions,
    ) -> Result<Box<dyn UpdateChecker>> {
        let entry = self
            .registry
            .iter()
            .find(|e| names_match(&e.name, &dependency.name))
            .cloned()
            .unwrap_or_else(|| {
                debug!("{} is not in the registry fixture", dependency.name);
                RegistryEntry {
                    name: dependency.name.clone(),
                    ..RegistryEntry::default()
                }
            });

        Ok(Box::new(StaticChecker {
            dependency: dependency.clone(),
            entry,
            options: options.clone(),
        }))
    }
}

pub struct StaticChecker {
    dependency: Dependency,
    entry: RegistryEntry,
    options: CheckerOptions,
}

impl StaticChecker {
    fn current(&self) -> Option<Version> {
        self.dependency.version().and_then(parse_version)
    }

    /// Published versions newer than the current one, ascending.
    fn newer_versions(&self) -> Vec<(Version, String)> {
        let current = self.current();

        let mut versions = self
            .entry
            .versions
            .iter()
            .filter_map(|raw| parse_version(raw).map(|v| (v, raw.clone())))
            .filter(|(v, _)| current.as_ref().is_none_or(|c| v > c))
            .collect::<Vec<(Version, String)>>();

        versions.sort_by(|a, b| a.0.cmp(&b.0));
        versions
    }

    fn allowed_versions(&self) -> Vec<(Version, String)> {
        self.newer_versions()
            .into_iter()
            .filter(|(_, raw)| !self.is_ignored(raw))
            .filter(|(_, raw)| !self.in_cooldown(raw))
            .collect()
    }

    /// Whether `version` was published too recently to be proposed.
    /// Security fixes are never held back.
    fn in_cooldown(&self, version: &str) -> bool {
        let Some(cooldown) = &self.options.cooldown else {
            return false;
        };
        if !cooldown.applies_to(&self.dependency.name) || self.is_vulnerable()
        {
            return false;
        }

        let (Some(current), Some(age)) =
            (self.dependency.version(), self.entry.age_days.get(version))
        else {
            return false;
        };

        match update_type(current, version) {
            Some(kind) if *age < cooldown.days_for(kind) => {
                debug!(
                    "{} {version} was published {age} day(s) ago, inside the {kind} cooldown",
                    self.dependency.name
                );
                true
            }
            _ => false,
        }
    }

    fn is_ignored(&self, version: &str) -> bool {
        self.options
            .ignore_conditions
            .iter()
            .any(|condition| self.ignores(condition, version))
    }

    fn ignores(&self, condition: &IgnoreCondition, version: &str) -> bool {
        if let Some(requirement) = &condition.version_requirement
            && requirement_matches(requirement, version)
        {
            return true;
        }

        let Some(current) = self.dependency.version() else {
            return false;
        };

        match update_type(current, version) {
            Some(kind) => condition
                .update_types
                .iter()
                .any(|t| t.ends_with(&format!("semver-{kind}"))),
            None => false,
        }
    }

    fn advisories(&self) -> impl Iterator<Item = &SecurityAdvisory> {
        self.options
            .security_advisories
            .iter()
            .filter(|a| names_match(&a.dependency_name, &self.dependency.name))
    }

    fn is_affected(&self, version: &str) -> bool {
        self.advisories().any(|advisory| {
            advisory
                .affected_versions
                .iter()
                .any(|req| requirement_matches(req, version))
        })
    }

    fn lowest_fix(&self) -> Option<String> {
        self.allowed_versions()
            .into_iter()
            .map(|(_, raw)| raw)
            .find(|raw| !self.is_affected(raw))
    }

    fn latest(&self) -> Option<String> {
        self.allowed_versions().pop().map(|(_, raw)| raw)
    }

    fn is_vulnerable(&self) -> bool {
        self.dependency
            .version()
            .is_some_and(|current| self.is_affected(current))
    }

    /// The version an update moves to: the lowest fix for a vulnerable
    /// dependency, the latest allowed version otherwise.
    fn target(&self) -> Option<String> {
        if self.is_vulnerable() {
            self.lowest_fix()
        } else {
            self.latest()
        }
    }

    fn rewrite(&self, requirement: &Requirement, target: &str) -> Requirement {
        let mut rewritten = requirement.clone();

        if let (Some(text), Some(current)) =
            (&requirement.requirement, self.dependency.version())
        {
            rewritten.requirement = Some(text.replace(current, target));
        }

        rewritten
    }
}

#[async_trait]
impl UpdateChecker for StaticChecker {
    async fn latest_version(&self) -> Result<Option<String>> {
        let newer = self.newer_versions();
        let latest = self.latest();

        if !newer.is_empty() && latest.is_none() && self.options.raise_on_ignored
        {
            return Err(UpdaterError::all_versions_ignored(
                &self.dependency.name,
            ));
        }

        Ok(latest.or_else(|| self.dependency.version.clone()))
    }

    async fn latest_resolvable_version(&self) -> Result<Option<String>> {
        if !self.entry.resolvable {
            return Ok(self.dependency.version.clone());
        }

        Ok(self.latest().or_else(|| self.dependency.version.clone()))
    }

    async fn lowest_security_fix_version(&self) -> Result<Option<String>> {
        Ok(self.lowest_fix())
    }

    async fn up_to_date(&self) -> Result<bool> {
        Ok(self.target().is_none())
    }

    async fn vulnerable(&self) -> Result<bool> {
        Ok(self.is_vulnerable())
    }

    async fn can_update(&self, scope: UnlockScope) -> Result<bool> {
        Ok(self.entry.resolvable
            && scope >= self.entry.unlock
            && self.target().is_some())
    }

    async fn requirements_unlocked_or_can_be(&self) -> Result<bool> {
        Ok(!self.entry.requirements_locked)
    }

    async fn updated_dependencies(
        &self,
        scope: UnlockScope,
    ) -> Result<Vec<Dependency>> {
        let Some(target) = self.target() else {
            return Ok(vec![]);
        };

        let requirements = match scope {
            UnlockScope::None => self.dependency.requirements.clone(),
            UnlockScope::Own | UnlockScope::All => self
                .dependency
                .requirements
                .iter()
                .map(|r| self.rewrite(r, &target))
                .collect(),
        };

        let mut lead = self.dependency.clone();
        lead.version = Some(target);
        lead.previous_version = self.dependency.version.clone();
        lead.requirements = requirements;
        lead.previous_requirements = self.dependency.requirements.clone();

        let mut updated = vec![lead];

        for moved in self.entry.moves.iter() {
            updated.push(
                DependencyBuilder::default()
                    .name(moved.name.clone())
                    .version(moved.version.clone())
                    .previous_version(moved.previous_version.clone())
                    .directory(self.dependency.directory.clone())
                    .build()?,
            );
        }

        Ok(updated)
    }

    async fn conflicting_dependencies(&self) -> Result<Vec<String>> {
        Ok(self.entry.conflicting_dependencies.clone())
    }
}

/// Evaluates a requirement such as ">= 2.0, < 3" or "= 1.2.3" against a
/// version. Unparseable input never matches.
fn requirement_matches(requirement: &str, version: &str) -> bool {
    let Some(version) = parse_version(version) else {
        return false;
    };

    match VersionReq::parse(requirement) {
        Ok(req) => req.matches(&version),
        Err(e) => {
            warn!("unable to parse version requirement '{requirement}': {e}");
            false
        }
    }
}
