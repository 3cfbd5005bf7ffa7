//! Pull request signatures and reconciliation of freshly computed changes
//! against pull requests that are already open or were submitted earlier
//! in the same run.
use log::*;
use std::collections::BTreeSet;

use crate::{
    change::DependencyChange,
    dependency::Dependency,
    helpers::name_key,
    job::{Job, PullRequestDependency},
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignatureEntry {
    /// Lowercased dependency name
    pub name: String,
    pub version: Option<String>,
    pub removed: bool,
}

/// Order-independent identity of a pull request's content.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestSignature {
    entries: BTreeSet<SignatureEntry>,
}

impl PullRequestSignature {
    pub fn of(dependencies: &[Dependency]) -> Self {
        let entries = dependencies
            .iter()
            .map(|d| SignatureEntry {
                name: name_key(&d.name),
                version: if d.removed { None } else { d.version.clone() },
                removed: d.removed,
            })
            .collect();

        Self { entries }
    }

    pub fn of_pull_request(dependencies: &[PullRequestDependency]) -> Self {
        let entries = dependencies
            .iter()
            .map(|d| SignatureEntry {
                name: name_key(&d.dependency_name),
                version: if d.dependency_removed {
                    None
                } else {
                    d.dependency_version.clone()
                },
                removed: d.dependency_removed,
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = &SignatureEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn same_names(&self, other: &PullRequestSignature) -> bool {
        self.names() == other.names()
    }
}

/// Signatures submitted and dependency sets closed during the current run.
#[derive(Debug, Default, Clone)]
pub struct CreatedPullRequests {
    submitted: Vec<PullRequestSignature>,
    closed: Vec<BTreeSet<String>>,
}

impl CreatedPullRequests {
    pub fn record_submitted(&mut self, signature: PullRequestSignature) {
        if !self.contains(&signature) {
            self.submitted.push(signature);
        }
    }

    pub fn record_closed(&mut self, names: &[String]) {
        let key = name_set(names);
        if !self.closed.contains(&key) {
            self.closed.push(key);
        }
    }

    pub fn contains(&self, signature: &PullRequestSignature) -> bool {
        self.submitted.contains(signature)
    }

    pub fn is_closed(&self, names: &[String]) -> bool {
        self.closed.contains(&name_set(names))
    }

    pub fn submitted(&self) -> &[PullRequestSignature] {
        &self.submitted
    }
}

/// What a strategy must do with a computed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The change updates nothing
    Nothing,
    /// An identical pull request is open or was submitted this run
    AlreadyExists,
    Create,
    /// Same dependencies as the refreshed pull request, new versions
    Update,
    /// Close the pull request for `superseded` with `dependencies_changed`,
    /// then create
    Replace { superseded: Vec<String> },
}

/// The pull request a refresh job targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshTarget {
    /// Dependency names as they appear on the pull request
    pub names: Vec<String>,
    /// Signature of the open pull request, when one was found
    pub signature: Option<PullRequestSignature>,
}

impl RefreshTarget {
    fn name_keys(&self) -> BTreeSet<String> {
        name_set(&self.names)
    }
}

pub struct PullRequestMatcher<'a> {
    job: &'a Job,
    created: &'a CreatedPullRequests,
}

impl<'a> PullRequestMatcher<'a> {
    pub fn new(job: &'a Job, created: &'a CreatedPullRequests) -> Self {
        Self { job, created }
    }

    fn existing_signatures(
        &self,
    ) -> impl Iterator<Item = PullRequestSignature> + '_ {
        let ungrouped = self
            .job
            .existing_pull_requests
            .iter()
            .map(|pr| PullRequestSignature::of_pull_request(&pr.dependencies));

        let grouped = self
            .job
            .existing_group_pull_requests
            .iter()
            .map(|pr| PullRequestSignature::of_pull_request(&pr.dependencies));

        ungrouped.chain(grouped)
    }

    /// Whether an open pull request or one submitted this run carries
    /// exactly `signature`.
    pub fn find_existing(&self, signature: &PullRequestSignature) -> bool {
        self.created.contains(signature)
            || self.existing_signatures().any(|s| s == *signature)
    }

    /// Whether an open ungrouped pull request already proposes `name` at
    /// `version`.
    pub fn pull_request_exists_for(&self, name: &str, version: &str) -> bool {
        self.job
            .existing_pull_requests
            .iter()
            .any(|pr| pr.contains_dependency(name, version))
    }

    /// Locates the pull request a refresh job is updating. Group refreshes
    /// use the group's open pull request, all others the open pull request
    /// whose dependency names equal the job's dependency list.
    pub fn refresh_target(&self) -> RefreshTarget {
        if let Some(group_name) = &self.job.dependency_group_to_refresh {
            return match self.job.existing_group_pull_request(group_name) {
                Some(pr) => RefreshTarget {
                    names: pr.dependency_names(),
                    signature: Some(PullRequestSignature::of_pull_request(
                        &pr.dependencies,
                    )),
                },
                None => RefreshTarget {
                    names: self.job.named_dependencies().to_vec(),
                    signature: None,
                },
            };
        }

        let names = self.job.named_dependencies().to_vec();
        let keys = name_set(&names);

        let signature = self
            .job
            .existing_pull_requests
            .iter()
            .map(|pr| PullRequestSignature::of_pull_request(&pr.dependencies))
            .find(|s| s.names() == keys);

        RefreshTarget { names, signature }
    }

    /// Decides how to submit a change computed by a create strategy.
    ///
    /// Individual changes that fully contain the dependencies of an open
    /// ungrouped pull request, but not only those, supersede it.
    pub fn reconcile_create(&self, change: &DependencyChange) -> Reconciliation {
        if change.is_empty() {
            return Reconciliation::Nothing;
        }

        let signature = PullRequestSignature::of(&change.updated_dependencies);

        if self.find_existing(&signature) {
            debug!("pull request already exists for {:?}", signature.names());
            return Reconciliation::AlreadyExists;
        }

        if !change.is_grouped() {
            let names = signature.names();

            let superseded = self.job.existing_pull_requests.iter().find(|pr| {
                let existing = name_set(&pr.dependency_names());
                !existing.is_empty()
                    && existing != names
                    && existing.is_subset(&names)
            });

            if let Some(pr) = superseded {
                return Reconciliation::Replace {
                    superseded: pr.dependency_names(),
                };
            }
        }

        Reconciliation::Create
    }

    /// Decides how to submit a change computed by a refresh strategy.
    pub fn reconcile_refresh(
        &self,
        change: &DependencyChange,
        target: &RefreshTarget,
    ) -> Reconciliation {
        if change.is_empty() {
            return Reconciliation::Nothing;
        }

        let signature = PullRequestSignature::of(&change.updated_dependencies);

        if self.find_existing(&signature) {
            debug!("pull request already exists for {:?}", signature.names());
            return Reconciliation::AlreadyExists;
        }

        if signature.names() != target.name_keys() {
            return Reconciliation::Replace {
                superseded: target.names.clone(),
            };
        }

        if target.signature.as_ref() == Some(&signature) {
            debug!("pull request is already up to date: {:?}", target.names);
            return Reconciliation::AlreadyExists;
        }

        Reconciliation::Update
    }
}

fn name_set(names: &[String]) -> BTreeSet<String> {
    names.iter().map(|n| name_key(n)).collect()
}
