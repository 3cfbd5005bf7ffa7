//! Common test helper functions shared across test modules.
//!
//! Fixtures here build dependencies, manifests and directory snapshots the
//! way an ecosystem file parser would hand them over.
use crate::{
    dependency::{Dependency, DependencyBuilder, DependencyFile, Requirement},
    job::{ExistingPullRequest, PullRequestDependency},
    local::checker::{RegistryEntry, TransitiveUpdate},
    snapshot::DirectorySnapshot,
};

pub const MANIFEST: &str = "Cargo.toml";

/// Creates a top-level production dependency declared in [`MANIFEST`].
///
/// # Example
/// ```ignore
/// let serde = create_test_dependency("serde", "1.0.0");
/// ```
pub fn create_test_dependency(name: &str, version: &str) -> Dependency {
    DependencyBuilder::default()
        .name(name)
        .version(version)
        .requirements(vec![Requirement::new(MANIFEST, version)])
        .build()
        .unwrap()
}

/// Creates a development-only dependency declared in [`MANIFEST`].
pub fn create_test_dev_dependency(name: &str, version: &str) -> Dependency {
    let mut dependency = create_test_dependency(name, version);
    dependency.production = false;
    dependency
}

/// Renders a manifest declaring every dependency on its own line.
pub fn create_test_manifest(
    directory: &str,
    dependencies: &[Dependency],
) -> DependencyFile {
    let content = dependencies
        .iter()
        .map(|d| format!("{} = \"{}\"\n", d.name, d.version().unwrap_or("*")))
        .collect::<String>();

    DependencyFile::new(MANIFEST, directory, format!("[dependencies]\n{content}"))
}

/// A directory whose manifest declares `dependencies`.
pub fn create_test_directory(
    directory: &str,
    dependencies: Vec<Dependency>,
) -> DirectorySnapshot {
    let manifest = create_test_manifest(directory, &dependencies);
    DirectorySnapshot::new(directory, dependencies, vec![manifest])
}

/// Registry data publishing `versions` for `name`.
pub fn create_test_registry_entry(
    name: &str,
    versions: &[&str],
) -> RegistryEntry {
    RegistryEntry {
        name: name.to_string(),
        versions: versions.iter().map(|v| v.to_string()).collect(),
        ..RegistryEntry::default()
    }
}

/// Registry data for an update of `name` that also moves `moved` from
/// `from` to `to`.
pub fn create_test_registry_entry_with_move(
    name: &str,
    versions: &[&str],
    moved: (&str, &str, &str),
) -> RegistryEntry {
    let (moved_name, from, to) = moved;

    RegistryEntry {
        moves: vec![TransitiveUpdate {
            name: moved_name.to_string(),
            version: to.to_string(),
            previous_version: from.to_string(),
        }],
        ..create_test_registry_entry(name, versions)
    }
}

/// An open pull request updating each `(name, version)` pair.
pub fn create_test_existing_pr(updates: &[(&str, &str)]) -> ExistingPullRequest {
    ExistingPullRequest::new(
        updates
            .iter()
            .map(|(name, version)| PullRequestDependency::new(*name, *version))
            .collect(),
    )
}
