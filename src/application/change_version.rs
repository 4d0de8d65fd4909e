//! Version-change preview and application.
//!
//! Switching an installed package to another version is previewed first: the
//! target's core compatibility plus the dependency diff between the two
//! releases. Applying the change upserts the added and updated dependencies
//! and moves the root record to the target version, pending installation.

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Serialize;

use crate::compat::{CompatibilityChecker, CompatibilityReport};
use crate::diff::{self, DiffEntry, DiffStatus};
use crate::package::{
    CoreVersionProvider, DependencyStore, FORMAT_JAR, FORMAT_SOURCE, InstalledDependency,
    PackageRepository, PackageVersion, STATUS_PENDING,
};

use super::install::determine_version_status;

/// What a version change would do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionChange {
    pub compatibility: CompatibilityReport,
    /// Set when the target version is not compatible with the installed
    /// core. The change is still applicable; the flag drives a confirmation
    /// prompt upstream.
    pub warning: bool,
    pub entries: Vec<DiffEntry>,
}

/// Version-change use case.
pub struct ChangeVersionPreview<'a> {
    repository: &'a dyn PackageRepository,
    core: &'a dyn CoreVersionProvider,
}

impl<'a> ChangeVersionPreview<'a> {
    pub fn new(repository: &'a dyn PackageRepository, core: &'a dyn CoreVersionProvider) -> Self {
        Self { repository, core }
    }

    /// Preview switching a package from `current` to `target`.
    #[tracing::instrument(skip(self))]
    pub fn preview(
        &self,
        group: &str,
        artifact: &str,
        current: &str,
        target: &str,
    ) -> Result<VersionChange> {
        let current_pv = self.lookup(group, artifact, current)?;
        let target_pv = self.lookup(group, artifact, target)?;

        let compatibility =
            CompatibilityChecker::new(self.repository, self.core).check(&target_pv);
        let entries = diff::diff(&current_pv, &target_pv);

        debug!(
            "Version change {}:{} {} -> {}: {} change(s), compatible: {}",
            group,
            artifact,
            current,
            target,
            entries.len(),
            compatibility.compatible
        );

        Ok(VersionChange {
            warning: !compatibility.compatible,
            compatibility,
            entries,
        })
    }

    /// Preview and persist a version change.
    ///
    /// New and updated dependencies are upserted; deleted ones are left to
    /// the uninstall flow. The root record moves to the target version with
    /// installation pending.
    #[tracing::instrument(skip(self, store))]
    pub fn apply(
        &self,
        group: &str,
        artifact: &str,
        current: &str,
        target: &str,
        store: &mut dyn DependencyStore,
    ) -> Result<VersionChange> {
        let change = self.preview(group, artifact, current, target)?;
        let target_pv = self.lookup(group, artifact, target)?;
        let target_deps = diff::dependency_map(&target_pv);

        for entry in &change.entries {
            if entry.status == DiffStatus::Deleted {
                continue;
            }
            let key = format!("{}:{}", entry.group, entry.artifact);
            let Some(dependency) = target_deps.get(&key) else {
                continue;
            };
            let format = if dependency.external { FORMAT_JAR } else { FORMAT_SOURCE };
            store
                .upsert(InstalledDependency {
                    group: dependency.group.clone(),
                    artifact: dependency.artifact.clone(),
                    version: dependency.version.clone(),
                    format: format.to_string(),
                    installation_status: STATUS_PENDING.to_string(),
                    version_status: determine_version_status(
                        self.repository,
                        &dependency.group,
                        &dependency.artifact,
                        &dependency.version,
                    ),
                    external: dependency.external,
                })
                .with_context(|| format!("Failed to store {}", key))?;
        }

        store
            .upsert(InstalledDependency {
                group: group.to_string(),
                artifact: artifact.to_string(),
                version: target.to_string(),
                format: FORMAT_SOURCE.to_string(),
                installation_status: STATUS_PENDING.to_string(),
                version_status: determine_version_status(self.repository, group, artifact, target),
                external: false,
            })
            .with_context(|| format!("Failed to store {}:{}", group, artifact))?;

        Ok(change)
    }

    fn lookup(&self, group: &str, artifact: &str, version: &str) -> Result<PackageVersion> {
        self.repository
            .version(group, artifact, version)
            .ok_or_else(|| anyhow!("Package version not found: {}:{}@{}", group, artifact, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{
        Dependency, ETENDO_CORE, MockCoreVersionProvider, MockDependencyStore,
        MockPackageRepository, VERSION_UNTRACKED,
    };

    fn core_provider(version: &str) -> MockCoreVersionProvider {
        let version = version.to_string();
        let mut core = MockCoreVersionProvider::new();
        core.expect_current_core_version()
            .returning(move || Ok(version.clone()));
        core
    }

    fn dep(artifact: &str, version: &str) -> Dependency {
        Dependency {
            group: "com.acme".into(),
            artifact: artifact.into(),
            version: version.into(),
            external: true,
            target_id: None,
        }
    }

    fn release(version: &str, core_range: &str, deps: Vec<Dependency>) -> PackageVersion {
        let mut dependencies = vec![Dependency {
            group: "com.etendoerp.platform".into(),
            artifact: ETENDO_CORE.into(),
            version: core_range.into(),
            external: true,
            target_id: None,
        }];
        dependencies.extend(deps);
        PackageVersion {
            id: format!("pv-{version}"),
            group: "com.acme".into(),
            artifact: "app".into(),
            version: version.into(),
            dependencies,
            ..Default::default()
        }
    }

    fn repo_with(a: PackageVersion, b: PackageVersion) -> MockPackageRepository {
        let mut repo = MockPackageRepository::new();
        repo.expect_version()
            .returning(move |_, _, v| match v {
                v if v == a.version => Some(a.clone()),
                v if v == b.version => Some(b.clone()),
                _ => None,
            });
        repo.expect_versions().returning(|_, _| vec![]);
        repo
    }

    #[test]
    fn test_preview_reports_diff_and_compatibility() {
        let repo = repo_with(
            release("1.0.0", "[24.0.0,25.0.0)", vec![dep("lib", "1.0.0")]),
            release("2.0.0", "[24.0.0,25.0.0)", vec![dep("lib", "2.0.0")]),
        );
        let core = core_provider("24.2.0");

        let change = ChangeVersionPreview::new(&repo, &core)
            .preview("com.acme", "app", "1.0.0", "2.0.0")
            .unwrap();

        assert!(change.compatibility.compatible);
        assert!(!change.warning);
        assert_eq!(change.entries.len(), 1);
        assert_eq!(change.entries[0].status, DiffStatus::Updated);
    }

    #[test]
    fn test_preview_warns_on_incompatible_target() {
        let repo = repo_with(
            release("1.0.0", "[24.0.0,25.0.0)", vec![]),
            release("2.0.0", "[25.0.0,26.0.0)", vec![]),
        );
        let core = core_provider("24.2.0");

        let change = ChangeVersionPreview::new(&repo, &core)
            .preview("com.acme", "app", "1.0.0", "2.0.0")
            .unwrap();

        assert!(!change.compatibility.compatible);
        assert!(change.warning);
    }

    #[test]
    fn test_preview_missing_version_fails() {
        let repo = repo_with(
            release("1.0.0", "[24.0.0,25.0.0)", vec![]),
            release("2.0.0", "[24.0.0,25.0.0)", vec![]),
        );
        let core = core_provider("24.2.0");

        let err = ChangeVersionPreview::new(&repo, &core)
            .preview("com.acme", "app", "1.0.0", "9.9.9")
            .unwrap_err();
        assert!(err.to_string().contains("com.acme:app@9.9.9"));
    }

    #[test]
    fn test_apply_upserts_changed_dependencies_and_root() {
        let repo = repo_with(
            release("1.0.0", "[24.0.0,25.0.0)", vec![dep("dropped", "1.0.0")]),
            release(
                "2.0.0",
                "[24.0.0,25.0.0)",
                vec![dep("added", "1.0.0")],
            ),
        );
        let core = core_provider("24.2.0");
        let mut store = MockDependencyStore::new();
        let upserted = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = upserted.clone();
        store.expect_upsert().times(2).returning(move |record| {
            sink.lock().unwrap().push(record.artifact.clone());
            Ok(())
        });

        let change = ChangeVersionPreview::new(&repo, &core)
            .apply("com.acme", "app", "1.0.0", "2.0.0", &mut store)
            .unwrap();

        assert_eq!(change.entries.len(), 2);
        assert_eq!(
            *upserted.lock().unwrap(),
            vec!["added".to_string(), "app".to_string()]
        );
    }

    #[test]
    fn test_apply_external_dependency_gets_jar_format() {
        let repo = repo_with(
            release("1.0.0", "[24.0.0,25.0.0)", vec![]),
            release("2.0.0", "[24.0.0,25.0.0)", vec![dep("jarlib", "3.0.0")]),
        );
        let core = core_provider("24.2.0");
        let mut store = MockDependencyStore::new();
        store
            .expect_upsert()
            .withf(|record| {
                record.artifact != "jarlib"
                    || (record.format == FORMAT_JAR
                        && record.version_status == VERSION_UNTRACKED
                        && record.external)
            })
            .times(2)
            .returning(|_| Ok(()));

        ChangeVersionPreview::new(&repo, &core)
            .apply("com.acme", "app", "1.0.0", "2.0.0", &mut store)
            .unwrap();
    }
}
