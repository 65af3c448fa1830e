// Dependency closure resolution over the nested package-lock tree

use crate::lockfile::{DependencyMap, DependencyRecord, PackageLock};
use std::collections::{BTreeSet, VecDeque};

/// Lookup context for resolving a required package name
///
/// Holds the chain of `dependencies` maps from the root down to the record
/// currently being expanded. A lookup walks the chain from the innermost map
/// outwards, so the copy installed closest to the requiring package wins over
/// any more distant one, the hoisted root copy included.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    /// Root map first, innermost last
    levels: Vec<&'a DependencyMap>,
}

impl<'a> Scope<'a> {
    /// Scope containing only the hoisted root installs
    pub fn root(lock: &'a PackageLock) -> Self {
        Self {
            levels: vec![&lock.dependencies],
        }
    }

    /// Scope seen by the requirements of `record`
    ///
    /// Adds the record's nested installs as the innermost level. A record
    /// without nested installs sees the same chain as its parent.
    pub fn enter(&self, record: &'a DependencyRecord) -> Self {
        let mut levels = self.levels.clone();
        if let Some(nested) = record.nested() {
            levels.push(nested);
        }
        Self { levels }
    }

    /// Find the nearest installation of `name`
    ///
    /// Returns the record together with the scope it was installed in, i.e.
    /// the chain truncated at the level where the match was found. A hoisted
    /// record therefore never sees the nested installs of whoever required it.
    pub fn lookup(&self, name: &str) -> Option<(&'a DependencyRecord, Scope<'a>)> {
        self.levels
            .iter()
            .enumerate()
            .rev()
            .find_map(|(depth, map)| map.get(name).map(|record| (depth, record)))
            .map(|(depth, record)| {
                let scope = Scope {
                    levels: self.levels[..=depth].to_vec(),
                };
                (record, scope)
            })
    }

    /// Number of maps in the chain, root included
    pub fn depth(&self) -> usize {
        self.levels.len()
    }
}

/// Locate a top-level name anywhere in the tree
///
/// The root map is checked first. Names that are only installed nested are
/// found at their first occurrence in a name-ordered depth-first walk.
fn locate<'a>(lock: &'a PackageLock, name: &str) -> Option<(&'a DependencyRecord, Scope<'a>)> {
    fn search<'a>(
        map: &'a DependencyMap,
        scope: Scope<'a>,
        name: &str,
    ) -> Option<(&'a DependencyRecord, Scope<'a>)> {
        if let Some(record) = map.get(name) {
            return Some((record, scope));
        }
        map.values().find_map(|record| {
            record
                .nested()
                .and_then(|nested| search(nested, scope.enter(record), name))
        })
    }

    search(&lock.dependencies, Scope::root(lock), name)
}

/// Compute the sorted, duplicate-free set of package names reachable from
/// `initial_names` by following `requires` edges.
///
/// Each name is expanded at most once, using the first record encountered
/// for it. Names without any installed record are kept as leaves.
pub fn compute_closure<S: AsRef<str>>(lock: &PackageLock, initial_names: &[S]) -> Vec<String> {
    let mut visited: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<(&DependencyRecord, Scope<'_>)> = VecDeque::new();

    for name in initial_names {
        let name = name.as_ref();
        if !visited.insert(name.to_string()) {
            continue;
        }
        match locate(lock, name) {
            Some(found) => queue.push_back(found),
            None => tracing::debug!(package = name, "No record in lockfile, treating as leaf"),
        }
    }

    while let Some((record, scope)) = queue.pop_front() {
        let inner = scope.enter(record);
        for required in record.required_names() {
            if !visited.insert(required.to_string()) {
                continue;
            }
            match inner.lookup(required) {
                Some(found) => {
                    tracing::trace!(package = required, depth = found.1.depth(), "Expanding");
                    queue.push_back(found);
                }
                None => tracing::debug!(package = required, "No record in lockfile, treating as leaf"),
            }
        }
    }

    tracing::debug!(
        requested = initial_names.len(),
        resolved = visited.len(),
        "Computed dependency closure"
    );

    visited.into_iter().collect()
}
