#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    change::DependencyChange,
    dependency::{Dependency, DependencyFile},
    job::Job,
};

/// Rewrites dependency files for a set of updated dependencies.
#[cfg_attr(test, automock)]
pub trait DependencyChangeBuilder: Send + Sync {
    /// Produces the change realizing `updated_dependencies` on top of
    /// `dependency_files`. `group` names the dependency group the change is
    /// built for.
    fn build(
        &self,
        job: &Job,
        dependency_files: &[DependencyFile],
        updated_dependencies: &[Dependency],
        group: Option<String>,
    ) -> Result<DependencyChange>;
}
