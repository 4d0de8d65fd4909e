//! JSON-file-backed package catalog.
//!
//! The CLI operates on a catalog file: a JSON snapshot of the tracked
//! package universe plus the installed core version. The catalog implements
//! the repository and core-version collaborator traits so the core
//! components stay unaware of where the data came from.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use super::repository::{CoreVersionProvider, PackageRepository};
use super::{PackageRef, PackageVersion};

/// On-disk catalog document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogFile {
    /// Installed core platform version.
    pub core_version: String,
    /// Every tracked package version, flattened.
    #[serde(default)]
    pub packages: Vec<PackageVersion>,
}

/// In-memory catalog, indexed for id and coordinate lookups.
#[derive(Debug)]
pub struct Catalog {
    core_version: String,
    by_id: HashMap<String, PackageVersion>,
    by_coordinates: HashMap<(String, String), Vec<String>>,
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Catalog> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {:?}", path))?;
        let file: CatalogFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file {:?}", path))?;
        Ok(Self::from_file(file))
    }

    /// Build a catalog from an already-parsed document.
    pub fn from_file(file: CatalogFile) -> Catalog {
        let mut by_id = HashMap::new();
        let mut by_coordinates: HashMap<(String, String), Vec<String>> = HashMap::new();

        for version in file.packages {
            let key = (version.group.clone(), version.artifact.clone());
            by_coordinates.entry(key).or_default().push(version.id.clone());
            if by_id.insert(version.id.clone(), version).is_some() {
                debug!("Duplicate package version id in catalog, keeping last");
            }
        }

        debug!(
            "Loaded catalog: {} version(s), core {}",
            by_id.len(),
            file.core_version
        );

        Catalog {
            core_version: file.core_version,
            by_id,
            by_coordinates,
        }
    }

    /// Override the recorded core version (CLI `--core-version`).
    pub fn set_core_version(&mut self, version: String) {
        self.core_version = version;
    }
}

impl PackageRepository for Catalog {
    fn find_package(&self, group: &str, artifact: &str) -> Option<PackageRef> {
        let key = (group.to_string(), artifact.to_string());
        self.by_coordinates
            .contains_key(&key)
            .then(|| PackageRef::new(group, artifact))
    }

    fn version(&self, group: &str, artifact: &str, version: &str) -> Option<PackageVersion> {
        let key = (group.to_string(), artifact.to_string());
        self.by_coordinates.get(&key)?.iter().find_map(|id| {
            self.by_id
                .get(id)
                .filter(|pv| pv.version == version)
                .cloned()
        })
    }

    fn version_by_id(&self, id: &str) -> Option<PackageVersion> {
        self.by_id.get(id).cloned()
    }

    fn versions(&self, group: &str, artifact: &str) -> Vec<PackageVersion> {
        let key = (group.to_string(), artifact.to_string());
        self.by_coordinates
            .get(&key)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.by_id.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl CoreVersionProvider for Catalog {
    fn current_core_version(&self) -> Result<String> {
        Ok(self.core_version.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_file() -> CatalogFile {
        CatalogFile {
            core_version: "24.2.0".into(),
            packages: vec![
                PackageVersion {
                    id: "pv-foo-1".into(),
                    group: "com.acme".into(),
                    artifact: "foo".into(),
                    version: "1.0.0".into(),
                    ..Default::default()
                },
                PackageVersion {
                    id: "pv-foo-2".into(),
                    group: "com.acme".into(),
                    artifact: "foo".into(),
                    version: "2.0.0".into(),
                    ..Default::default()
                },
                PackageVersion {
                    id: "pv-bar-1".into(),
                    group: "com.acme".into(),
                    artifact: "bar".into(),
                    version: "1.0.0".into(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_find_package() {
        let catalog = Catalog::from_file(sample_file());
        assert_eq!(
            catalog.find_package("com.acme", "foo"),
            Some(PackageRef::new("com.acme", "foo"))
        );
        assert_eq!(catalog.find_package("com.acme", "missing"), None);
    }

    #[test]
    fn test_version_lookup() {
        let catalog = Catalog::from_file(sample_file());
        let found = catalog.version("com.acme", "foo", "2.0.0").unwrap();
        assert_eq!(found.id, "pv-foo-2");
        assert!(catalog.version("com.acme", "foo", "9.9.9").is_none());
    }

    #[test]
    fn test_version_by_id() {
        let catalog = Catalog::from_file(sample_file());
        assert_eq!(
            catalog.version_by_id("pv-bar-1").unwrap().artifact,
            "bar"
        );
        assert!(catalog.version_by_id("nope").is_none());
    }

    #[test]
    fn test_versions_lists_all() {
        let catalog = Catalog::from_file(sample_file());
        let versions = catalog.versions("com.acme", "foo");
        assert_eq!(versions.len(), 2);
        assert!(catalog.versions("com.acme", "missing").is_empty());
    }

    #[test]
    fn test_core_version_and_override() {
        let mut catalog = Catalog::from_file(sample_file());
        assert_eq!(catalog.current_core_version().unwrap(), "24.2.0");
        catalog.set_core_version("25.1.0".into());
        assert_eq!(catalog.current_core_version().unwrap(), "25.1.0");
    }

    #[test]
    fn test_load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample_file()).unwrap();
        tmp.write_all(json.as_bytes()).unwrap();

        let catalog = Catalog::load(tmp.path()).unwrap();
        assert_eq!(catalog.current_core_version().unwrap(), "24.2.0");
        assert!(catalog.version_by_id("pv-foo-1").is_some());
    }

    #[test]
    fn test_load_invalid_json_fails_with_context() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"not json").unwrap();

        let err = Catalog::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse catalog file"));
    }

    #[test]
    fn test_load_missing_file_fails_with_context() {
        let err = Catalog::load(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog file"));
    }
}
