//! Installed package discovery.
//!
//! Builds a snapshot of the distributions visible to a Python interpreter
//! by reading their metadata straight from disk:
//!
//! - `<name>-<version>.dist-info/METADATA` (wheels, modern installs)
//! - `<name>.egg-info/PKG-INFO` (setuptools develop installs)
//! - `<name>.egg-info` files (legacy distutils installs)
//!
//! Search directories come from the interpreter's `sys.path`, or are given
//! explicitly. The first distribution found for a name wins, matching
//! import resolution order.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::requirement::normalize_name;
use crate::error::{PrepkitError, Result};

/// Prints the interpreter search path as a JSON array.
const SYS_PATH_SCRIPT: &str = "import json, sys; print(json.dumps(sys.path))";

/// An installed distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    /// Name from the distribution metadata.
    pub name: String,
    /// Version string from the distribution metadata.
    pub version: String,
}

/// Read-only snapshot of installed distributions, keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct InstalledPackages {
    packages: HashMap<String, InstalledPackage>,
}

impl InstalledPackages {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(name, version)` pairs.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut snapshot = Self::new();
        for (name, version) in pairs {
            snapshot.record(name.into(), version.into());
        }
        snapshot
    }

    /// Snapshot the distributions visible to `interpreter`.
    pub fn discover(interpreter: &str) -> Result<Self> {
        let dirs = interpreter_search_path(interpreter)?;
        tracing::debug!(
            "Scanning {} search path entries from {}",
            dirs.len(),
            interpreter
        );
        Self::scan(&dirs)
    }

    /// Snapshot the distributions found in the given directories.
    ///
    /// Directories that do not exist are ignored.
    pub fn scan(dirs: &[PathBuf]) -> Result<Self> {
        let mut snapshot = Self::new();
        for dir in dirs {
            if !dir.is_dir() {
                continue;
            }
            snapshot.scan_dir(dir);
        }
        tracing::debug!("Found {} installed distributions", snapshot.len());
        Ok(snapshot)
    }

    fn scan_dir(&mut self, dir: &Path) {
        let listing = match fs::read_dir(dir) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::debug!("Unreadable search path entry {}: {}", dir.display(), e);
                return;
            }
        };
        let mut entries: Vec<PathBuf> = listing
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        for path in entries {
            let Some(metadata_path) = metadata_file(&path) else {
                continue;
            };
            let content = match fs::read_to_string(&metadata_path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("Unreadable metadata {}: {}", metadata_path.display(), e);
                    continue;
                }
            };
            match parse_metadata(&content) {
                Some((name, version)) => self.record(name, version),
                None => tracing::debug!(
                    "Metadata without Name/Version: {}",
                    metadata_path.display()
                ),
            }
        }
    }

    fn record(&mut self, name: String, version: String) {
        self.packages
            .entry(normalize_name(&name))
            .or_insert(InstalledPackage { name, version });
    }

    /// Look up a distribution by name, ignoring case and separators.
    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.packages.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Locate the metadata file for a site-packages entry, if it is one.
fn metadata_file(path: &Path) -> Option<PathBuf> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.ends_with(".dist-info") && path.is_dir() {
        return Some(path.join("METADATA"));
    }
    if file_name.ends_with(".egg-info") {
        if path.is_dir() {
            return Some(path.join("PKG-INFO"));
        }
        return Some(path.to_path_buf());
    }
    None
}

/// Extract `Name` and `Version` from a core metadata header block.
fn parse_metadata(content: &str) -> Option<(String, String)> {
    let mut name = None;
    let mut version = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            match key.trim().to_ascii_lowercase().as_str() {
                "name" if name.is_none() => name = Some(value.trim().to_string()),
                "version" if version.is_none() => version = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    Some((name?, version?))
}

/// Ask `interpreter` for its `sys.path`.
fn interpreter_search_path(interpreter: &str) -> Result<Vec<PathBuf>> {
    let output = Command::new(interpreter)
        .args(["-c", SYS_PATH_SCRIPT])
        .output()
        .map_err(|e| PrepkitError::EnvironmentInspection {
            interpreter: interpreter.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(PrepkitError::EnvironmentInspection {
            interpreter: interpreter.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let entries: Vec<String> =
        serde_json::from_slice(&output.stdout).map_err(|e| PrepkitError::EnvironmentInspection {
            interpreter: interpreter.to_string(),
            message: format!("unexpected sys.path output: {}", e),
        })?;

    Ok(entries
        .into_iter()
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_dist_info(dir: &Path, name: &str, version: &str) {
        let info = dir.join(format!("{}-{}.dist-info", name, version));
        fs::create_dir_all(&info).unwrap();
        fs::write(
            info.join("METADATA"),
            format!(
                "Metadata-Version: 2.1\nName: {}\nVersion: {}\nSummary: test\n\nVersion: 0.0.0 in body\n",
                name, version
            ),
        )
        .unwrap();
    }

    #[test]
    fn from_pairs_normalizes_names() {
        let installed = InstalledPackages::from_pairs([("PyYAML", "6.0.1")]);
        assert_eq!(installed.get("pyyaml").unwrap().version, "6.0.1");
        assert_eq!(installed.get("PYYAML").unwrap().name, "PyYAML");
    }

    #[test]
    fn scans_dist_info_directories() {
        let temp = TempDir::new().unwrap();
        write_dist_info(temp.path(), "numpy", "1.26.4");
        write_dist_info(temp.path(), "astropy", "6.0.1");

        let installed = InstalledPackages::scan(&[temp.path().to_path_buf()]).unwrap();
        assert_eq!(installed.len(), 2);
        assert_eq!(installed.get("numpy").unwrap().version, "1.26.4");
    }

    #[test]
    fn metadata_body_is_not_parsed() {
        let temp = TempDir::new().unwrap();
        write_dist_info(temp.path(), "numpy", "1.26.4");
        let installed = InstalledPackages::scan(&[temp.path().to_path_buf()]).unwrap();
        assert_eq!(installed.get("numpy").unwrap().version, "1.26.4");
    }

    #[test]
    fn scans_egg_info_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let egg_dir = temp.path().join("romancal.egg-info");
        fs::create_dir_all(&egg_dir).unwrap();
        fs::write(egg_dir.join("PKG-INFO"), "Name: romancal\nVersion: 0.14.1\n").unwrap();
        fs::write(
            temp.path().join("legacy-1.0-py3.11.egg-info"),
            "Metadata-Version: 1.0\nName: legacy\nVersion: 1.0\n",
        )
        .unwrap();

        let installed = InstalledPackages::scan(&[temp.path().to_path_buf()]).unwrap();
        assert_eq!(installed.get("romancal").unwrap().version, "0.14.1");
        assert_eq!(installed.get("legacy").unwrap().version, "1.0");
    }

    #[test]
    fn first_search_path_entry_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_dist_info(first.path(), "scipy", "1.13.0");
        write_dist_info(second.path(), "scipy", "1.9.0");

        let installed = InstalledPackages::scan(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .unwrap();
        assert_eq!(installed.get("scipy").unwrap().version, "1.13.0");
    }

    #[test]
    fn missing_directories_are_ignored() {
        let installed =
            InstalledPackages::scan(&[PathBuf::from("/nonexistent/site-packages")]).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn unlistable_entry_does_not_abort_scan() {
        let temp = TempDir::new().unwrap();
        let zipped = temp.path().join("python311.zip");
        fs::write(&zipped, "PK").unwrap();
        write_dist_info(temp.path(), "numpy", "1.26.4");

        let mut installed = InstalledPackages::new();
        installed.scan_dir(&zipped);
        installed.scan_dir(temp.path());

        assert_eq!(installed.len(), 1);
        assert_eq!(installed.get("numpy").unwrap().version, "1.26.4");
    }

    #[test]
    fn metadata_without_version_is_skipped() {
        let temp = TempDir::new().unwrap();
        let info = temp.path().join("broken-0.1.dist-info");
        fs::create_dir_all(&info).unwrap();
        fs::write(info.join("METADATA"), "Name: broken\n").unwrap();

        let installed = InstalledPackages::scan(&[temp.path().to_path_buf()]).unwrap();
        assert!(installed.get("broken").is_none());
    }

    #[test]
    fn unknown_interpreter_is_an_inspection_error() {
        let err = InstalledPackages::discover("prepkit-no-such-python").unwrap_err();
        assert!(matches!(err, PrepkitError::EnvironmentInspection { .. }));
    }
}
