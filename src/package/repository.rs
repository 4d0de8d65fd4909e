//! Collaborator traits for package metadata access.
//!
//! The resolution core never fetches or persists anything itself; it reads
//! package metadata through [`PackageRepository`], asks the installed core
//! version from [`CoreVersionProvider`], and hands persisted records to a
//! [`DependencyStore`]. Implementations live at the edges (the JSON catalog
//! here, a database in the hosting application).

use anyhow::Result;

use super::{InstalledDependency, PackageRef, PackageVersion};

/// Read access to the tracked package universe.
#[cfg_attr(test, mockall::automock)]
pub trait PackageRepository {
    /// Look up a package identity by coordinates.
    fn find_package(&self, group: &str, artifact: &str) -> Option<PackageRef>;

    /// Fetch one published version of a package.
    fn version(&self, group: &str, artifact: &str, version: &str) -> Option<PackageVersion>;

    /// Fetch a package version by its id. Dependency edges reference their
    /// targets this way.
    fn version_by_id(&self, id: &str) -> Option<PackageVersion>;

    /// All published versions of a package, in no particular order.
    fn versions(&self, group: &str, artifact: &str) -> Vec<PackageVersion>;
}

/// Source of the currently installed core platform version.
#[cfg_attr(test, mockall::automock)]
pub trait CoreVersionProvider {
    fn current_core_version(&self) -> Result<String>;
}

/// Sink for installed-dependency records.
///
/// `upsert` must honor the (group, artifact) uniqueness invariant: an
/// existing record for the same coordinates is updated in place, otherwise a
/// new one is created. The invariant belongs to the store, not to callers.
#[cfg_attr(test, mockall::automock)]
pub trait DependencyStore {
    fn find(&self, group: &str, artifact: &str) -> Option<InstalledDependency>;

    fn upsert(&mut self, record: InstalledDependency) -> Result<()>;
}
