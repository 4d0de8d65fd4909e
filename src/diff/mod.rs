//! Dependency diff between two package versions.
//!
//! Given the dependency lists of two releases of the same package, the diff
//! reports which declared dependencies are new, which disappeared, and which
//! changed version. Unchanged dependencies are omitted. The core platform
//! edge is excluded up front since every release declares one.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::package::{Dependency, PackageVersion};

/// Kind of change a dependency underwent between two releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiffStatus {
    /// Present in the second release only.
    New,
    /// Present in the first release only.
    Deleted,
    /// Present in both with different versions.
    Updated,
}

/// One changed dependency.
///
/// Absent versions render as the literal string `"null"`, matching the
/// upgrade-dialog convention the consumers of this report expect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffEntry {
    pub group: String,
    pub artifact: String,
    pub version_a: Option<String>,
    pub version_b: Option<String>,
    pub status: DiffStatus,
}

impl DiffEntry {
    pub fn rendered_version_a(&self) -> &str {
        self.version_a.as_deref().unwrap_or("null")
    }

    pub fn rendered_version_b(&self) -> &str {
        self.version_b.as_deref().unwrap_or("null")
    }
}

/// Declared dependencies of a release, keyed `group:artifact`, core edge
/// excluded. Later duplicates of a key overwrite earlier ones.
pub fn dependency_map(package_version: &PackageVersion) -> BTreeMap<String, Dependency> {
    package_version
        .dependencies
        .iter()
        .filter(|dep| !dep.is_core())
        .map(|dep| (dep.key(), dep.clone()))
        .collect()
}

/// Diff the declared dependencies of release `a` against release `b`.
///
/// Entries come out ordered by `group:artifact` key.
pub fn diff(a: &PackageVersion, b: &PackageVersion) -> Vec<DiffEntry> {
    let map_a = dependency_map(a);
    let map_b = dependency_map(b);
    let mut entries = Vec::new();

    for (key, dep_a) in &map_a {
        match map_b.get(key) {
            None => entries.push(DiffEntry {
                group: dep_a.group.clone(),
                artifact: dep_a.artifact.clone(),
                version_a: Some(dep_a.version.clone()),
                version_b: None,
                status: DiffStatus::Deleted,
            }),
            Some(dep_b) if dep_b.version != dep_a.version => entries.push(DiffEntry {
                group: dep_a.group.clone(),
                artifact: dep_a.artifact.clone(),
                version_a: Some(dep_a.version.clone()),
                version_b: Some(dep_b.version.clone()),
                status: DiffStatus::Updated,
            }),
            Some(_) => {}
        }
    }

    for (key, dep_b) in &map_b {
        if !map_a.contains_key(key) {
            entries.push(DiffEntry {
                group: dep_b.group.clone(),
                artifact: dep_b.artifact.clone(),
                version_a: None,
                version_b: Some(dep_b.version.clone()),
                status: DiffStatus::New,
            });
        }
    }

    entries.sort_by(|x, y| {
        format!("{}:{}", x.group, x.artifact).cmp(&format!("{}:{}", y.group, y.artifact))
    });
    entries
}
