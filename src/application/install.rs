//! Install planning.
//!
//! Planning an installation resolves the requested package version, checks
//! its core compatibility, and turns the resolved dependency closure into
//! installed-dependency records. Applying the plan upserts those records;
//! nothing touches the filesystem here.

use std::cmp::Ordering;

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Serialize;

use crate::compat::{CompatibilityChecker, CompatibilityReport};
use crate::package::{
    CoreVersionProvider, Dependency, DependencyStore, FORMAT_JAR, FORMAT_SOURCE,
    InstalledDependency, PackageRepository, PackageVersion, STATUS_PENDING, VERSION_UP_TO_DATE,
    VERSION_UPDATE_AVAILABLE, VERSION_UNTRACKED,
};
use crate::resolver::Resolver;
use crate::version;

/// Everything an installation would record: the requested package, its core
/// compatibility, and one pending record per package in the closure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallPlan {
    pub package: String,
    pub version: String,
    pub compatibility: CompatibilityReport,
    pub records: Vec<InstalledDependency>,
}

/// Install-planning use case.
pub struct InstallPlanner<'a> {
    repository: &'a dyn PackageRepository,
    core: &'a dyn CoreVersionProvider,
}

impl<'a> InstallPlanner<'a> {
    pub fn new(repository: &'a dyn PackageRepository, core: &'a dyn CoreVersionProvider) -> Self {
        Self { repository, core }
    }

    /// Build the install plan for one package version.
    ///
    /// The requested version and every tracked node in its closure must exist
    /// in the repository; anything missing fails the whole plan.
    #[tracing::instrument(skip(self))]
    pub fn plan(&self, group: &str, artifact: &str, version: &str) -> Result<InstallPlan> {
        let package_version = self
            .repository
            .version(group, artifact, version)
            .ok_or_else(|| anyhow!("Package version not found: {}:{}@{}", group, artifact, version))?;

        let compatibility =
            CompatibilityChecker::new(self.repository, self.core).check(&package_version);

        let dependencies = Resolver::new(self.repository)
            .resolve(&package_version)
            .with_context(|| format!("Failed to resolve dependencies of {}", package_version))?;

        let mut records = vec![self.root_record(&package_version)];
        for dependency in &dependencies {
            records.push(self.dependency_record(dependency));
        }

        debug!(
            "Planned installation of {} with {} record(s)",
            package_version,
            records.len()
        );

        Ok(InstallPlan {
            package: format!("{}:{}", group, artifact),
            version: version.to_string(),
            compatibility,
            records,
        })
    }

    /// Persist every record of a plan.
    #[tracing::instrument(skip_all)]
    pub fn apply(&self, plan: &InstallPlan, store: &mut dyn DependencyStore) -> Result<()> {
        for record in &plan.records {
            store
                .upsert(record.clone())
                .with_context(|| format!("Failed to store {}:{}", record.group, record.artifact))?;
        }
        Ok(())
    }

    fn root_record(&self, package_version: &PackageVersion) -> InstalledDependency {
        InstalledDependency {
            group: package_version.group.clone(),
            artifact: package_version.artifact.clone(),
            version: package_version.version.clone(),
            format: FORMAT_SOURCE.to_string(),
            installation_status: STATUS_PENDING.to_string(),
            version_status: determine_version_status(
                self.repository,
                &package_version.group,
                &package_version.artifact,
                &package_version.version,
            ),
            external: false,
        }
    }

    fn dependency_record(&self, dependency: &Dependency) -> InstalledDependency {
        let (format, version_status) = if dependency.external {
            (FORMAT_JAR, VERSION_UNTRACKED.to_string())
        } else {
            (
                FORMAT_SOURCE,
                determine_version_status(
                    self.repository,
                    &dependency.group,
                    &dependency.artifact,
                    &dependency.version,
                ),
            )
        };
        InstalledDependency {
            group: dependency.group.clone(),
            artifact: dependency.artifact.clone(),
            version: dependency.version.clone(),
            format: format.to_string(),
            installation_status: STATUS_PENDING.to_string(),
            version_status,
            external: dependency.external,
        }
    }
}

/// Version status of an installed version relative to the newest one the
/// repository knows.
///
/// Unknown packages and unorderable versions are untracked; a `RELEASE`
/// declaration always tracks the latest by definition.
pub(crate) fn determine_version_status(
    repository: &dyn PackageRepository,
    group: &str,
    artifact: &str,
    installed: &str,
) -> String {
    if version::is_release(installed) {
        return VERSION_UP_TO_DATE.to_string();
    }

    let mut newest: Option<String> = None;
    for candidate in repository.versions(group, artifact) {
        if version::parse_segments(&candidate.version).is_err() {
            continue;
        }
        let newer = match &newest {
            None => true,
            Some(current) => {
                matches!(version::compare(&candidate.version, current), Ok(Ordering::Greater))
            }
        };
        if newer {
            newest = Some(candidate.version);
        }
    }

    let Some(newest) = newest else {
        return VERSION_UNTRACKED.to_string();
    };

    match version::compare(installed, &newest) {
        Ok(Ordering::Less) => VERSION_UPDATE_AVAILABLE.to_string(),
        Ok(_) => VERSION_UP_TO_DATE.to_string(),
        Err(_) => VERSION_UNTRACKED.to_string(),
    }
}
