//! Repetition of a computation across the job's directories.
use log::*;

use crate::{change::DependencyChange, job::Job, snapshot::DependencySnapshot};

/// What happens to handled dependency tracking when a strategy moves to
/// the next directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum HandledPolicy {
    #[default]
    Keep,
    /// Every directory is evaluated independently
    ResetPerDirectory,
}

/// Drives a computation once per directory and merges the results.
///
/// ```ignore
/// let mut merger = DirectoryMerger::new(&job, HandledPolicy::Keep);
/// for directory in merger.directories() {
///     merger.enter(&mut snapshot, &directory);
///     merger.add(compute(&mut snapshot)?);
/// }
/// let change = merger.finish();
/// ```
#[derive(Debug)]
pub struct DirectoryMerger {
    directories: Vec<String>,
    policy: HandledPolicy,
    merged: DependencyChange,
}

impl DirectoryMerger {
    pub fn new(job: &Job, policy: HandledPolicy) -> Self {
        Self {
            directories: job.directories(),
            policy,
            merged: DependencyChange::default(),
        }
    }

    pub fn directories(&self) -> Vec<String> {
        self.directories.clone()
    }

    pub fn policy(&self) -> HandledPolicy {
        self.policy
    }

    /// Points the snapshot at `directory`, applying the handled policy.
    pub fn enter(&self, snapshot: &mut DependencySnapshot, directory: &str) {
        snapshot.set_current_directory(directory);

        if self.policy == HandledPolicy::ResetPerDirectory {
            snapshot.reset_handled_dependencies();
        }
    }

    /// Adds one directory's result. Empty results contribute nothing.
    pub fn add(&mut self, change: DependencyChange) {
        if change.is_empty() {
            debug!("directory produced no updates");
            return;
        }

        let merged = std::mem::take(&mut self.merged);
        self.merged = merged.merge(change);
    }

    pub fn finish(self) -> DependencyChange {
        self.merged
    }
}

/// Merges changes in order, skipping empty ones.
pub fn merge_changes<I>(changes: I) -> DependencyChange
where
    I: IntoIterator<Item = DependencyChange>,
{
    changes
        .into_iter()
        .filter(|c| !c.is_empty())
        .fold(DependencyChange::default(), DependencyChange::merge)
}
