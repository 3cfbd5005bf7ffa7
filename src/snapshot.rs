//! Per-job mutable state: parsed dependencies per directory, materialized
//! groups, handled dependency tracking and the ledger of pull requests
//! submitted during the run.
use log::*;
use std::rc::Rc;

use crate::{
    dependency::{Dependency, DependencyFile},
    error::{Result, UpdaterError},
    helpers::{names_match, normalize_directory},
    job::Job,
    matcher::CreatedPullRequests,
};

pub mod group;
pub mod handled;

pub use group::DependencyGroup;
pub use handled::HandledDependencies;

/// Dependencies and dependency files parsed from one directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorySnapshot {
    pub directory: String,
    pub dependencies: Vec<Dependency>,
    pub dependency_files: Vec<DependencyFile>,
}

impl DirectorySnapshot {
    pub fn new(
        directory: &str,
        dependencies: Vec<Dependency>,
        dependency_files: Vec<DependencyFile>,
    ) -> Self {
        let directory = normalize_directory(directory).into_owned();

        let dependencies = dependencies
            .into_iter()
            .map(|mut d| {
                d.directory = directory.clone();
                d
            })
            .collect();

        Self {
            directory,
            dependencies,
            dependency_files,
        }
    }
}

#[derive(Debug)]
pub struct DependencySnapshot {
    job: Rc<Job>,
    base_commit_sha: String,
    directories: Vec<DirectorySnapshot>,
    current_directory: String,
    groups: Vec<DependencyGroup>,
    handled: HandledDependencies,
    created: CreatedPullRequests,
}

impl DependencySnapshot {
    /// Creates a snapshot positioned on the job's first directory. Every
    /// job directory must have been parsed.
    pub fn new(
        job: Rc<Job>,
        base_commit_sha: impl Into<String>,
        directories: Vec<DirectorySnapshot>,
    ) -> Result<Self> {
        for directory in job.directories() {
            if !directories.iter().any(|d| d.directory == directory) {
                return Err(UpdaterError::DependencyFileNotFound(format!(
                    "no dependency files parsed for directory {directory}"
                )));
            }
        }

        let current_directory = job
            .directories()
            .into_iter()
            .next()
            .unwrap_or_else(|| crate::job::ROOT_DIRECTORY.to_string());

        let mut snapshot = Self {
            job,
            base_commit_sha: base_commit_sha.into(),
            directories,
            current_directory,
            groups: vec![],
            handled: HandledDependencies::new(),
            created: CreatedPullRequests::default(),
        };

        snapshot.materialize_groups();

        Ok(snapshot)
    }

    pub fn job(&self) -> &Rc<Job> {
        &self.job
    }

    pub fn base_commit_sha(&self) -> &str {
        &self.base_commit_sha
    }

    pub fn current_directory(&self) -> &str {
        &self.current_directory
    }

    /// Moves the cursor to `directory` and re-materializes groups against
    /// its dependencies.
    pub fn set_current_directory(&mut self, directory: &str) {
        let directory = normalize_directory(directory).into_owned();

        if directory == self.current_directory {
            return;
        }

        debug!("switching to directory {directory}");
        self.current_directory = directory;
        self.materialize_groups();
    }

    fn current(&self) -> Option<&DirectorySnapshot> {
        self.directories
            .iter()
            .find(|d| d.directory == self.current_directory)
    }

    /// Dependencies parsed from the current directory.
    pub fn dependencies(&self) -> &[Dependency] {
        self.current()
            .map(|d| d.dependencies.as_slice())
            .unwrap_or_default()
    }

    pub fn dependency_files(&self) -> &[DependencyFile] {
        self.current()
            .map(|d| d.dependency_files.as_slice())
            .unwrap_or_default()
    }

    /// Dependencies of the current directory the job allows updating.
    pub fn allowed_dependencies(&self) -> Vec<Dependency> {
        self.dependencies()
            .iter()
            .filter(|d| self.job.allowed_update(d))
            .cloned()
            .collect()
    }

    /// Dependencies of the current directory named by the job.
    pub fn job_dependencies(&self) -> Vec<Dependency> {
        self.dependencies()
            .iter()
            .filter(|d| self.job.names_dependency(&d.name))
            .cloned()
            .collect()
    }

    /// Dependencies named by the job across every directory.
    pub fn all_job_dependencies(&self) -> Vec<Dependency> {
        self.directories
            .iter()
            .flat_map(|d| d.dependencies.iter())
            .filter(|d| self.job.names_dependency(&d.name))
            .cloned()
            .collect()
    }

    /// Every configured group, materialized against the current directory.
    pub fn all_groups(&self) -> &[DependencyGroup] {
        &self.groups
    }

    /// Groups that participate in this kind of job.
    pub fn groups(&self) -> Vec<&DependencyGroup> {
        let applies_to = self
            .job
            .applicable_groups()
            .map(|g| g.name.as_str())
            .collect::<Vec<&str>>();

        self.groups
            .iter()
            .filter(|g| applies_to.contains(&g.name.as_str()))
            .collect()
    }

    pub fn group(&self, name: &str) -> Option<&DependencyGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The group being refreshed, if it is still configured.
    pub fn job_group(&self) -> Option<&DependencyGroup> {
        self.job
            .dependency_group_to_refresh
            .as_deref()
            .and_then(|name| self.group(name))
    }

    /// Allowed dependencies of the current directory that no group or
    /// earlier unit of work has claimed.
    pub fn ungrouped_dependencies(&self) -> Vec<Dependency> {
        self.allowed_dependencies()
            .into_iter()
            .filter(|d| !self.handled.contains(&d.name))
            .collect()
    }

    pub fn handled_dependencies(&self) -> &HandledDependencies {
        &self.handled
    }

    pub fn add_handled_dependencies<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.handled.add_all(names);
    }

    pub fn is_handled(&self, name: &str) -> bool {
        self.handled.contains(name)
    }

    pub fn reset_handled_dependencies(&mut self) {
        debug!("resetting handled dependencies");
        self.handled.clear();
    }

    pub fn created_pull_requests(&self) -> &CreatedPullRequests {
        &self.created
    }

    pub fn created_pull_requests_mut(&mut self) -> &mut CreatedPullRequests {
        &mut self.created
    }

    /// Looks up a dependency of the current directory by name.
    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies().iter().find(|d| names_match(&d.name, name))
    }

    fn materialize_groups(&mut self) {
        let candidates = self.allowed_dependencies();

        self.groups = self
            .job
            .dependency_groups
            .iter()
            .map(|config| {
                let mut group = DependencyGroup::from_config(config);
                group.assign(&candidates);
                group
            })
            .collect();
    }
}
