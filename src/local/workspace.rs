//! Workspace fixture: the parsed dependencies of each directory plus the
//! registry data the static checker answers from.
//!
//! ```toml
//! base-commit-sha = "4b825dc"
//!
//! [[directories]]
//! directory = "/"
//!
//! [[directories.files]]
//! name = "Cargo.toml"
//! content = """
//! [dependencies]
//! serde = "1.0.100"
//! """
//!
//! [[directories.dependencies]]
//! name = "serde"
//! version = "1.0.100"
//! requirements = [{ file = "Cargo.toml", requirement = "1.0.100" }]
//!
//! [[registry]]
//! name = "serde"
//! versions = ["1.0.100", "1.0.200"]
//! ```
use log::*;
use serde::Deserialize;
use std::{path::Path, rc::Rc};
use tokio::fs;

use crate::{
    Result,
    dependency::{Dependency, DependencyFile},
    helpers::normalize_directory,
    job::Job,
    local::checker::{RegistryEntry, StaticCheckerFactory},
    snapshot::{DependencySnapshot, DirectorySnapshot},
};

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorkspaceDirectory {
    pub directory: String,
    pub files: Vec<DependencyFile>,
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Workspace {
    pub base_commit_sha: String,
    pub directories: Vec<WorkspaceDirectory>,
    pub registry: Vec<RegistryEntry>,
}

impl Workspace {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        debug!("loading workspace fixture: {}", path.display());
        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Builds the dependency snapshot `job` runs against. Files without a
    /// directory inherit the one they are listed under.
    pub fn snapshot(&self, job: Rc<Job>) -> Result<DependencySnapshot> {
        let directories = self
            .directories
            .iter()
            .map(|d| {
                let directory = normalize_directory(&d.directory).into_owned();

                let files = d
                    .files
                    .iter()
                    .cloned()
                    .map(|mut f| {
                        if f.directory.is_empty() {
                            f.directory = directory.clone();
                        }
                        f
                    })
                    .collect();

                DirectorySnapshot::new(&directory, d.dependencies.clone(), files)
            })
            .collect();

        DependencySnapshot::new(job, self.base_commit_sha.clone(), directories)
    }

    pub fn checker_factory(&self) -> StaticCheckerFactory {
        StaticCheckerFactory::new(self.registry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpdaterError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIXTURE: &str = r#"
base-commit-sha = "abc123"

[[directories]]
directory = "api/"

[[directories.files]]
name = "Cargo.toml"
content = "serde = \"1.0.0\""

[[directories.dependencies]]
name = "serde"
version = "1.0.0"
requirements = [{ file = "Cargo.toml", requirement = "1.0.0" }]

[[registry]]
name = "serde"
versions = ["1.0.0", "1.0.1"]
unlock = "none"
"#;

    #[test]
    fn parses_fixture() {
        let workspace = Workspace::parse(FIXTURE).unwrap();

        assert_eq!(workspace.base_commit_sha, "abc123");
        assert_eq!(workspace.directories[0].dependencies[0].name, "serde");
        assert!(workspace.directories[0].dependencies[0].production);
        assert_eq!(
            workspace.registry[0].unlock,
            crate::checker::UnlockScope::None
        );
        assert!(workspace.registry[0].resolvable);
    }

    #[test]
    fn builds_snapshot_for_job_directories() {
        let workspace = Workspace::parse(FIXTURE).unwrap();
        let job = Rc::new(
            Job::builder()
                .id("1")
                .package_manager("cargo")
                .directory("/api")
                .build()
                .unwrap(),
        );

        let snapshot = workspace.snapshot(job).unwrap();

        assert_eq!(snapshot.current_directory(), "/api");
        assert_eq!(snapshot.dependencies()[0].directory, "/api");
        assert_eq!(snapshot.dependency_files()[0].directory, "/api");
        assert_eq!(snapshot.base_commit_sha(), "abc123");
    }

    #[test]
    fn missing_job_directory_is_an_error() {
        let workspace = Workspace::parse(FIXTURE).unwrap();
        let job = Rc::new(Job::builder().id("1").build().unwrap());

        assert!(matches!(
            workspace.snapshot(job),
            Err(UpdaterError::DependencyFileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn loads_fixture_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let workspace = Workspace::load(file.path()).await.unwrap();

        assert_eq!(workspace.registry.len(), 1);
    }

    #[test]
    fn rejects_malformed_fixture() {
        assert!(matches!(
            Workspace::parse("directories = 3"),
            Err(UpdaterError::TomlParseError(_))
        ));
    }
}
