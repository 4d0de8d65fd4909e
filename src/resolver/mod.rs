//! Transitive dependency resolution.
//!
//! Given a root package version, compute the flattened, de-duplicated set of
//! dependencies reachable from it. Conflicts between versions of the same
//! artifact resolve to the newest numeric version, except that the floating
//! `RELEASE` sentinel always wins: a rolling-release declaration takes
//! precedence over any pinned version discovered elsewhere in the graph.
//!
//! The core platform edge (`etendo-core`) never enters the result, and
//! bundle artifacts (`.extensions`) are dropped from the final output even
//! though they take part in traversal bookkeeping.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::debug;

use crate::package::{Dependency, PackageRepository, PackageVersion};
use crate::version::{self, VersionError};

/// Failure during graph traversal. Aborts the whole resolution; no partial
/// result is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("dependency {group}:{artifact} has no resolved target version")]
    MissingTarget { group: String, artifact: String },
    #[error("package version '{id}' referenced by {group}:{artifact} not found")]
    TargetNotFound {
        id: String,
        group: String,
        artifact: String,
    },
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Dependency graph resolver over an injected package repository.
pub struct Resolver<'a> {
    repository: &'a dyn PackageRepository,
}

impl<'a> Resolver<'a> {
    pub fn new(repository: &'a dyn PackageRepository) -> Self {
        Self { repository }
    }

    /// Resolve the full dependency set of `root`.
    ///
    /// Returns the conflict-resolved closure with core and bundle artifacts
    /// excluded. Any traversal failure aborts the whole call.
    pub fn resolve(&self, root: &PackageVersion) -> Result<Vec<Dependency>, ResolveError> {
        // Conflict map keyed by artifact name only, as the hosting platform
        // does: artifacts are assumed globally unique across groups within
        // the tracked ecosystem.
        let mut resolved: HashMap<String, Dependency> = HashMap::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root.id.clone());

        for dependency in root.dependencies.iter().filter(|d| !d.is_core()) {
            self.insert(&mut resolved, dependency)?;
            self.descend(dependency, &mut resolved, &mut visited)?;
        }

        let mut result: Vec<Dependency> = resolved
            .into_values()
            .filter(|d| !d.is_bundle())
            .collect();
        result.sort_by(|a, b| a.artifact.cmp(&b.artifact));

        debug!("Resolved {} dependency(ies) for {}", result.len(), root);
        Ok(result)
    }

    /// Walk into a non-external dependency's target and feed every sub-edge
    /// through conflict resolution, recursively.
    ///
    /// The visited set is keyed by package-version id and bounds the
    /// traversal on cyclic or self-referential data; revisiting a node stops
    /// descent without error.
    fn descend(
        &self,
        dependency: &Dependency,
        resolved: &mut HashMap<String, Dependency>,
        visited: &mut HashSet<String>,
    ) -> Result<(), ResolveError> {
        if dependency.external {
            return Ok(());
        }

        let target_id =
            dependency
                .target_id
                .as_deref()
                .ok_or_else(|| ResolveError::MissingTarget {
                    group: dependency.group.clone(),
                    artifact: dependency.artifact.clone(),
                })?;

        if !visited.insert(target_id.to_string()) {
            debug!("Already visited '{}', stopping descent", target_id);
            return Ok(());
        }

        let target =
            self.repository
                .version_by_id(target_id)
                .ok_or_else(|| ResolveError::TargetNotFound {
                    id: target_id.to_string(),
                    group: dependency.group.clone(),
                    artifact: dependency.artifact.clone(),
                })?;

        // A target that only depends on the core platform contributes
        // nothing further.
        if let [only] = target.dependencies.as_slice()
            && only.is_core()
        {
            return Ok(());
        }

        for sub in target.dependencies.iter().filter(|d| !d.is_core()) {
            self.insert(resolved, sub)?;
            self.descend(sub, resolved, visited)?;
        }

        Ok(())
    }

    /// Insert an edge into the conflict map.
    ///
    /// `RELEASE` always replaces the current entry; otherwise the numerically
    /// newer version wins and ties keep the existing entry.
    fn insert(
        &self,
        resolved: &mut HashMap<String, Dependency>,
        dependency: &Dependency,
    ) -> Result<(), ResolveError> {
        let key = dependency.artifact.clone();

        let Some(current) = resolved.get(&key) else {
            resolved.insert(key, dependency.clone());
            return Ok(());
        };

        if version::is_release(&dependency.version) {
            debug!(
                "RELEASE declaration for '{}' overrides {}",
                dependency.artifact, current.version
            );
            resolved.insert(key, dependency.clone());
            return Ok(());
        }

        if !version::is_release(&current.version)
            && version::compare(&dependency.version, &current.version)? == Ordering::Greater
        {
            resolved.insert(key, dependency.clone());
        }

        Ok(())
    }
}
