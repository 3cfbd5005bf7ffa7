use std::collections::BTreeSet;

use crate::helpers::name_key;

/// Names of dependencies already processed during a run. Names are stored
/// lowercased so lookups ignore case.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HandledDependencies {
    names: BTreeSet<String>,
}

impl HandledDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as handled. Returns false when it already was.
    pub fn add(&mut self, name: &str) -> bool {
        self.names.insert(name_key(name))
    }

    pub fn add_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.add(name.as_ref());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name_key(name))
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
