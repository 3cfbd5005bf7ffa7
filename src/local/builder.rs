//! Change builder that rewrites versions literally in dependency files.
use color_eyre::eyre::eyre;
use log::*;
use regex::{Captures, Regex};

use crate::{
    Result, UpdaterError,
    change::DependencyChange,
    change_builder::DependencyChangeBuilder,
    dependency::{Dependency, DependencyFile},
    job::Job,
};

/// Replaces the previous version of each updated dependency with its new
/// version on every line that mentions the dependency. Lines of removed
/// dependencies are dropped.
pub struct LiteralChangeBuilder {}

impl LiteralChangeBuilder {
    pub fn new() -> Self {
        Self {}
    }

    fn update_content(
        &self,
        content: &str,
        dependency: &Dependency,
    ) -> Result<String> {
        let name = regex::escape(&dependency.name);

        if dependency.removed {
            let re = Regex::new(&format!(
                r"(?m)^(?:.*?[^\w\n-])?{name}(?:[^\w\n-].*)?$\n?"
            ))?;
            return Ok(re.replace_all(content, "").to_string());
        }

        let (Some(previous), Some(version)) =
            (&dependency.previous_version, &dependency.version)
        else {
            return Ok(content.to_string());
        };

        let re = Regex::new(&format!(
            r"(?m)^(?P<head>(?:.*?[^\w\n-])?{name}(?:[^\w\n-].*?)?){}(?P<tail>.*)$",
            regex::escape(previous)
        ))?;

        Ok(re
            .replace_all(content, |caps: &Captures| {
                format!("{}{version}{}", &caps["head"], &caps["tail"])
            })
            .to_string())
    }

    /// Whether `file` should be rewritten for `dependency`. Dependencies
    /// without requirements only live in lockfiles, so every file is a
    /// candidate.
    fn applies_to(dependency: &Dependency, file: &DependencyFile) -> bool {
        if file.support_file {
            return false;
        }

        (dependency.previous_requirements.is_empty()
            && dependency.requirements.is_empty())
            || dependency
                .requirements
                .iter()
                .chain(dependency.previous_requirements.iter())
                .any(|r| r.file == file.name)
            || file.name.ends_with(".lock")
            || file.name.contains("lock.")
    }
}

impl Default for LiteralChangeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyChangeBuilder for LiteralChangeBuilder {
    fn build(
        &self,
        _job: &Job,
        dependency_files: &[DependencyFile],
        updated_dependencies: &[Dependency],
        group: Option<String>,
    ) -> Result<DependencyChange> {
        let mut updated_files = vec![];

        for file in dependency_files.iter() {
            let mut content = file.content.clone();

            for dependency in updated_dependencies.iter() {
                if Self::applies_to(dependency, file) {
                    content = self.update_content(&content, dependency)?;
                }
            }

            if content != file.content {
                debug!("rewrote {}", file.path());
                updated_files.push(DependencyFile {
                    content,
                    ..file.clone()
                });
            }
        }

        if updated_files.is_empty() {
            let names = updated_dependencies
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<&str>>()
                .join(", ");
            return Err(UpdaterError::Other(eyre!(
                "no dependency files changed when updating {names}"
            )));
        }

        Ok(DependencyChange::new(
            updated_dependencies.to_vec(),
            updated_files,
        )
        .with_group(group))
    }
}
