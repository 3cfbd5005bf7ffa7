use crate::{
    change::DependencyChange,
    dependency::{Dependency, DependencyFile},
    helpers::names_match,
    snapshot::HandledDependencies,
};

/// Accumulates the changes of one group within one directory. Later
/// members are checked against the files rewritten by earlier ones.
#[derive(Debug, Default, Clone)]
pub struct GroupChangeBatch {
    current_files: Vec<DependencyFile>,
    updated_files: Vec<DependencyFile>,
    dependencies: Vec<Dependency>,
    declined: HandledDependencies,
}

impl GroupChangeBatch {
    pub fn new(dependency_files: &[DependencyFile]) -> Self {
        Self {
            current_files: dependency_files.to_vec(),
            ..Default::default()
        }
    }

    /// Dependency files with every change merged so far applied.
    pub fn current_files(&self) -> &[DependencyFile] {
        &self.current_files
    }

    pub fn updates(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| names_match(&d.name, name))
    }

    /// Records that the group's rules turned `name` away.
    pub fn decline(&mut self, name: &str) {
        self.declined.add(name);
    }

    pub fn declined(&self) -> Vec<String> {
        self.declined.names().map(String::from).collect()
    }

    pub fn merge(&mut self, change: DependencyChange) {
        for file in change.updated_dependency_files {
            upsert_file(&mut self.current_files, file.clone());
            upsert_file(&mut self.updated_files, file);
        }

        for dependency in change.updated_dependencies {
            match self
                .dependencies
                .iter_mut()
                .find(|d| names_match(&d.name, &dependency.name))
            {
                Some(existing) => {
                    let previous_version = existing.previous_version.take();
                    let previous_requirements =
                        std::mem::take(&mut existing.previous_requirements);
                    *existing = Dependency {
                        previous_version,
                        previous_requirements,
                        ..dependency
                    };
                }
                None => self.dependencies.push(dependency),
            }
        }
    }

    pub fn into_change(self, group: Option<String>) -> DependencyChange {
        DependencyChange::new(self.dependencies, self.updated_files)
            .with_group(group)
    }
}

fn upsert_file(files: &mut Vec<DependencyFile>, file: DependencyFile) {
    match files
        .iter_mut()
        .find(|f| f.name == file.name && f.directory == file.directory)
    {
        Some(existing) => *existing = file,
        None => files.push(file),
    }
}
