//! Dependency bookkeeping between loaded assets.

use std::collections::{HashMap, HashSet};

/// Records which assets each loaded asset depends on.
///
/// Edges point from dependent to dependency and carry names only; the store
/// owns the assets themselves. Entries persist until the dependent is fully
/// unloaded so cascade unloads know what to release.
#[derive(Default)]
pub(crate) struct DependencyGraph {
    dependencies: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a dependency edge, ignoring duplicates.
    pub(crate) fn record(&mut self, dependent: &str, dependency: &str) {
        let deps = self.dependencies.entry(dependent.to_string()).or_default();
        if !deps.iter().any(|d| d == dependency) {
            deps.push(dependency.to_string());
        }
    }

    /// Drop all edges recorded for a dependent.
    pub(crate) fn remove(&mut self, dependent: &str) {
        self.dependencies.remove(dependent);
    }

    /// Direct dependencies of an asset, in recording order.
    pub(crate) fn dependencies_of(&self, name: &str) -> &[String] {
        self.dependencies
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// How many dependents reference `name`.
    pub(crate) fn inbound_count(&self, name: &str) -> usize {
        self.dependencies
            .values()
            .filter(|deps| deps.iter().any(|d| d == name))
            .count()
    }

    /// The transitive dependency closure of an asset, each name visited once.
    ///
    /// The root itself is not included.
    pub(crate) fn transitive_dependencies(&self, name: &str) -> Vec<String> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let mut stack: Vec<&str> = self
            .dependencies_of(name)
            .iter()
            .map(String::as_str)
            .collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current.to_string()) {
                continue;
            }
            out.push(current.to_string());
            for dep in self.dependencies_of(current) {
                stack.push(dep);
            }
        }
        out
    }

}
