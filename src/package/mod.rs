//! Package metadata model.
//!
//! The entities here are read-only snapshots handed to the resolution core
//! by a repository collaborator: a package identity, one published version
//! of a package, and the dependency edges that version declares. Nothing in
//! this crate mutates or persists them.

pub mod catalog;
pub mod repository;

pub use catalog::Catalog;
pub use repository::{CoreVersionProvider, DependencyStore, PackageRepository};
#[cfg(test)]
pub use repository::{MockCoreVersionProvider, MockDependencyStore, MockPackageRepository};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Artifact name of the core platform dependency. Every package may declare
/// a compatibility range against it; it is excluded from resolved output.
pub const ETENDO_CORE: &str = "etendo-core";

/// Substring marking bundle artifacts. Bundles participate in traversal but
/// are dropped from the final resolved set.
pub const BUNDLE_MARKER: &str = ".extensions";

/// Dependency record format: module distributed as source.
pub const FORMAT_SOURCE: &str = "S";
/// Dependency record format: external jar.
pub const FORMAT_JAR: &str = "J";
/// Dependency record format: local module.
pub const FORMAT_LOCAL: &str = "L";

/// Installation status for a dependency record awaiting installation.
pub const STATUS_PENDING: &str = "PENDING";
/// Installation status for an installed dependency record.
pub const STATUS_INSTALLED: &str = "INSTALLED";

/// Version status: installed version is the latest known.
pub const VERSION_UP_TO_DATE: &str = "U";
/// Version status: a newer version exists in the catalog.
pub const VERSION_UPDATE_AVAILABLE: &str = "UA";
/// Version status: the dependency is outside the tracked package universe.
pub const VERSION_UNTRACKED: &str = "UT";

/// Identity of a package, independent of version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRef {
    pub group: String,
    pub artifact: String,
}

impl PackageRef {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl FromStr for PackageRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Invalid package format. Expected 'group:artifact'.")
        }
        Ok(PackageRef {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
        })
    }
}

/// One published version of a package.
///
/// `from_core`/`latest_core` bound the core platform versions this release
/// was built against; the authoritative constraint is the `etendo-core`
/// dependency edge when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PackageVersion {
    pub id: String,
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[serde(default)]
    pub from_core: Option<String>,
    #[serde(default)]
    pub latest_core: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl PackageVersion {
    /// Package identity of this version.
    pub fn package_ref(&self) -> PackageRef {
        PackageRef::new(self.group.clone(), self.artifact.clone())
    }

    /// The declared `etendo-core` dependency edge, if any.
    pub fn core_dependency(&self) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.is_core())
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.group, self.artifact, self.version)
    }
}

/// A dependency edge declared by a [`PackageVersion`].
///
/// `external` marks dependencies outside the tracked package universe
/// (e.g. a third-party jar); those have no `target_id` and traversal does
/// not descend into them. Tracked dependencies carry the id of the
/// [`PackageVersion`] they resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Dependency {
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub target_id: Option<String>,
}

impl Dependency {
    /// True if this edge points at the core platform.
    pub fn is_core(&self) -> bool {
        self.artifact == ETENDO_CORE
    }

    /// True if this edge points at a bundle artifact.
    pub fn is_bundle(&self) -> bool {
        self.artifact.contains(BUNDLE_MARKER)
    }

    /// `group:artifact` key used by the diff engine.
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// A persisted installed-dependency record, produced by install planning and
/// upserted by the [`DependencyStore`] collaborator under a (group, artifact)
/// uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledDependency {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub format: String,
    pub installation_status: String,
    pub version_status: String,
    pub external: bool,
}
