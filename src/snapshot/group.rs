//! Dependency groups materialized against the dependencies of one
//! directory.

use crate::{
    dependency::Dependency,
    helpers::{names_match, parse_version, wildcard_match},
    job::{AppliesTo, GroupConfig, GroupDependencyType, GroupRules, UpdateType},
};

#[derive(Debug, Clone, PartialEq)]
pub struct DependencyGroup {
    pub name: String,
    pub applies_to: AppliesTo,
    pub rules: GroupRules,
    pub dependencies: Vec<Dependency>,
    /// Synthesized by a strategy rather than configured by the user.
    /// Changes produced for ad-hoc groups carry no group name.
    pub ad_hoc: bool,
}

impl DependencyGroup {
    pub fn from_config(config: &GroupConfig) -> Self {
        Self {
            name: config.name.clone(),
            applies_to: config.applies_to,
            rules: config.rules.clone(),
            dependencies: vec![],
            ad_hoc: false,
        }
    }

    /// Builds a group that holds exactly `dependencies`.
    pub fn ad_hoc(
        name: impl Into<String>,
        applies_to: AppliesTo,
        dependencies: Vec<Dependency>,
    ) -> Self {
        Self {
            name: name.into(),
            applies_to,
            rules: GroupRules::default(),
            dependencies,
            ad_hoc: true,
        }
    }

    /// Whether `dependency` satisfies the membership rules.
    pub fn matches(&self, dependency: &Dependency) -> bool {
        let rules = &self.rules;

        let included = rules.patterns.is_empty()
            || rules
                .patterns
                .iter()
                .any(|p| wildcard_match(p, &dependency.name));

        if !included {
            return false;
        }

        if rules
            .exclude_patterns
            .iter()
            .any(|p| wildcard_match(p, &dependency.name))
        {
            return false;
        }

        match rules.dependency_type {
            Some(GroupDependencyType::Production) => dependency.production,
            Some(GroupDependencyType::Development) => !dependency.production,
            None => true,
        }
    }

    /// Replaces the members with the matching entries of `candidates`.
    pub fn assign(&mut self, candidates: &[Dependency]) {
        self.dependencies = candidates
            .iter()
            .filter(|d| self.matches(d))
            .cloned()
            .collect();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| names_match(&d.name, name))
    }

    pub fn member_names(&self) -> Vec<String> {
        self.dependencies.iter().map(|d| d.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Whether moving `dependency` to `proposed` is an update type this
    /// group accepts. Versions that do not parse as semver are accepted.
    pub fn allows_update(&self, dependency: &Dependency, proposed: &str) -> bool {
        if self.rules.update_types.is_empty() {
            return true;
        }

        let Some(current) = dependency.version() else {
            return true;
        };

        match update_type(current, proposed) {
            Some(kind) => self.rules.update_types.contains(&kind),
            None => {
                log::debug!(
                    "unable to classify update of {} from {current} to {proposed}",
                    dependency.name
                );
                true
            }
        }
    }
}

/// Classifies a version move as a major, minor or patch update.
pub fn update_type(current: &str, proposed: &str) -> Option<UpdateType> {
    let current = parse_version(current)?;
    let proposed = parse_version(proposed)?;

    if current.major != proposed.major {
        Some(UpdateType::Major)
    } else if current.minor != proposed.minor {
        Some(UpdateType::Minor)
    } else {
        Some(UpdateType::Patch)
    }
}
