//! The result of updating one or more dependencies: the updated dependency
//! records plus the rewritten dependency files.
use serde::{Deserialize, Serialize};

use crate::{
    dependency::{Dependency, DependencyFile},
    helpers::names_match,
};

/// Informational message attached to a change, surfaced in the pull
/// request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Notice {
    pub mode: String,
    pub kind: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyChange {
    pub updated_dependencies: Vec<Dependency>,
    pub updated_dependency_files: Vec<DependencyFile>,
    /// Name of the dependency group that produced this change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

impl DependencyChange {
    pub fn new(
        updated_dependencies: Vec<Dependency>,
        updated_dependency_files: Vec<DependencyFile>,
    ) -> Self {
        Self {
            updated_dependencies,
            updated_dependency_files,
            group: None,
            notices: vec![],
        }
    }

    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.updated_dependencies.is_empty()
    }

    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }

    pub fn updated_dependency_names(&self) -> Vec<String> {
        self.updated_dependencies
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    pub fn updates_dependency(&self, name: &str) -> bool {
        self.updated_dependencies
            .iter()
            .any(|d| names_match(&d.name, name))
    }

    /// Combines two changes into a new one. Dependencies, files and notices
    /// are appended in order. The group name of `self` wins when both are
    /// set.
    pub fn merge(self, other: DependencyChange) -> DependencyChange {
        let mut updated_dependencies = self.updated_dependencies;
        updated_dependencies.extend(other.updated_dependencies);

        let mut updated_dependency_files = self.updated_dependency_files;
        updated_dependency_files.extend(other.updated_dependency_files);

        let mut notices = self.notices;
        notices.extend(other.notices);

        DependencyChange {
            updated_dependencies,
            updated_dependency_files,
            group: self.group.or(other.group),
            notices,
        }
    }
}
