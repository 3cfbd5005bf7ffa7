//! Parsed dependencies and dependency files as handed over by an ecosystem
//! file parser.
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A requirement declared for a dependency in one manifest. Treated as
/// opaque metadata by the orchestrator.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Requirement {
    pub file: String,
    pub requirement: Option<String>,
    pub groups: Vec<String>,
}

impl Requirement {
    pub fn new(file: impl Into<String>, requirement: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            requirement: Some(requirement.into()),
            groups: vec![],
        }
    }
}

/// A dependency, either as currently resolved in a directory or as it will
/// be after an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default, rename_all = "kebab-case")]
#[builder(
    default,
    setter(into),
    build_fn(error = "crate::error::UpdaterError")
)]
pub struct Dependency {
    pub name: String,
    #[builder(setter(into, strip_option))]
    pub version: Option<String>,
    #[builder(setter(into, strip_option))]
    pub previous_version: Option<String>,
    pub requirements: Vec<Requirement>,
    pub previous_requirements: Vec<Requirement>,
    /// Directory this dependency was parsed from
    pub directory: String,
    /// Production (as opposed to development-only) dependency
    pub production: bool,
    /// The update removes this dependency entirely
    pub removed: bool,
}

impl Default for Dependency {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: None,
            previous_version: None,
            requirements: vec![],
            previous_requirements: vec![],
            directory: crate::job::ROOT_DIRECTORY.to_string(),
            production: true,
            removed: false,
        }
    }
}

impl Dependency {
    /// Dependencies declared directly in a manifest carry at least one
    /// requirement. Transitive ones carry none.
    pub fn top_level(&self) -> bool {
        !self.requirements.is_empty()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_update(&self) -> bool {
        self.removed || self.version != self.previous_version
    }
}

/// A manifest or lockfile in one directory.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DependencyFile {
    pub name: String,
    pub directory: String,
    pub content: String,
    /// The file exists only to support the update and is never written
    pub support_file: bool,
}

impl DependencyFile {
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            content: content.into(),
            support_file: false,
        }
    }

    /// Path of the file relative to the repository root.
    pub fn path(&self) -> String {
        let directory = self.directory.trim_end_matches('/');
        format!("{directory}/{}", self.name.trim_start_matches('/'))
    }
}
