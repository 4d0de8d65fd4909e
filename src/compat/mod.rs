//! Core platform compatibility checks.
//!
//! A package version may declare a compatibility range against the
//! `etendo-core` artifact. The checker answers whether the currently
//! installed core version satisfies that range. Failures never propagate to
//! callers: a report degrades to "not compatible" with the error message
//! attached, because the result feeds a UI warning banner, not control flow.

use std::cmp::Ordering;

use log::{debug, warn};
use serde::Serialize;

use crate::package::{CoreVersionProvider, PackageRepository, PackageVersion};
use crate::version::{self, range_allows};

/// Outcome of a compatibility check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub compatible: bool,
    /// Declared core range, when the package declares one.
    pub core_range: Option<String>,
    /// Installed core version the check ran against.
    pub current_core_version: Option<String>,
    /// Lookup or provider failure, reported instead of thrown.
    pub error: Option<String>,
}

impl CompatibilityReport {
    fn failed(error: String) -> Self {
        CompatibilityReport {
            compatible: false,
            core_range: None,
            current_core_version: None,
            error: Some(error),
        }
    }
}

/// Compatibility checker over injected repository and core-version
/// collaborators.
pub struct CompatibilityChecker<'a> {
    repository: &'a dyn PackageRepository,
    core: &'a dyn CoreVersionProvider,
}

impl<'a> CompatibilityChecker<'a> {
    pub fn new(repository: &'a dyn PackageRepository, core: &'a dyn CoreVersionProvider) -> Self {
        Self { repository, core }
    }

    /// Check a package version against the installed core.
    ///
    /// No declared core constraint means compatible. A malformed range is
    /// never compatible.
    pub fn check(&self, package_version: &PackageVersion) -> CompatibilityReport {
        let current = match self.core.current_core_version() {
            Ok(v) => v,
            Err(e) => return CompatibilityReport::failed(format!("An error occurred: {}", e)),
        };

        let Some(core_dep) = package_version.core_dependency() else {
            debug!("{} declares no core constraint", package_version);
            return CompatibilityReport {
                compatible: true,
                core_range: None,
                current_core_version: Some(current),
                error: None,
            };
        };

        let range = core_dep.version.clone();
        let compatible = range_allows(&range, &current);
        CompatibilityReport {
            compatible,
            core_range: Some(range),
            current_core_version: Some(current),
            error: None,
        }
    }

    /// Check by coordinates, resolving the package version first.
    ///
    /// Missing packages or versions are reported through the `error` field.
    pub fn check_version(&self, group: &str, artifact: &str, version: &str) -> CompatibilityReport {
        match self.repository.version(group, artifact, version) {
            Some(package_version) => self.check(&package_version),
            None => CompatibilityReport::failed(format!(
                "Package version not found: {}:{}@{}",
                group, artifact, version
            )),
        }
    }

    /// Boolean convenience for call sites that only need a yes/no answer.
    pub fn is_compatible(&self, group: &str, artifact: &str, version: &str) -> bool {
        self.check_version(group, artifact, version).compatible
    }

    /// The newest core-compatible version of a package, falling back to the
    /// newest version when none is compatible.
    ///
    /// Versions that do not parse numerically (including `RELEASE`) are
    /// skipped when ordering candidates.
    pub fn latest_compatible_or_latest(
        &self,
        group: &str,
        artifact: &str,
    ) -> anyhow::Result<String> {
        let mut candidates: Vec<PackageVersion> = self
            .repository
            .versions(group, artifact)
            .into_iter()
            .filter(|pv| match version::parse_segments(&pv.version) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Skipping unorderable version of {}:{}: {}", group, artifact, e);
                    false
                }
            })
            .collect();

        if candidates.is_empty() {
            anyhow::bail!("No versions found for package {}:{}", group, artifact);
        }

        // Newest first.
        candidates.sort_by(|a, b| {
            version::compare(&b.version, &a.version).unwrap_or(Ordering::Equal)
        });

        for candidate in &candidates {
            if self.check(candidate).compatible {
                return Ok(candidate.version.clone());
            }
        }

        Ok(candidates[0].version.clone())
    }
}
