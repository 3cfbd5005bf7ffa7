//! Pull requests that were already open when the job was scheduled.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::helpers::names_match;

/// One dependency entry of an open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct PullRequestDependency {
    pub dependency_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_version: Option<String>,
    #[serde(default)]
    pub dependency_removed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl PullRequestDependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            dependency_name: name.into(),
            dependency_version: Some(version.into()),
            dependency_removed: false,
            directory: None,
        }
    }

    pub fn removed(name: impl Into<String>) -> Self {
        Self {
            dependency_name: name.into(),
            dependency_version: None,
            dependency_removed: true,
            directory: None,
        }
    }
}

/// An open, ungrouped pull request.
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ExistingPullRequest {
    pub dependencies: Vec<PullRequestDependency>,
}

impl ExistingPullRequest {
    pub fn new(dependencies: Vec<PullRequestDependency>) -> Self {
        Self { dependencies }
    }

    pub fn contains_dependency(&self, name: &str, version: &str) -> bool {
        self.dependencies.iter().any(|d| {
            !d.dependency_removed
                && names_match(&d.dependency_name, name)
                && d.dependency_version.as_deref() == Some(version)
        })
    }

    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .map(|d| d.dependency_name.clone())
            .collect()
    }
}

/// An open pull request owned by a dependency group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct ExistingGroupPullRequest {
    pub dependency_group_name: String,
    #[serde(default)]
    pub dependencies: Vec<PullRequestDependency>,
}

impl ExistingGroupPullRequest {
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .map(|d| d.dependency_name.clone())
            .collect()
    }
}
