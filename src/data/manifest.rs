//! Data manifests.
//!
//! A manifest names a remote base URL, the files to mirror from it, the
//! local destination directory, and optionally one auxiliary archive:
//!
//! ```yaml
//! base_url: https://example.org/workshop/
//! destination: data
//! resources:
//!   - ExampleData/exposure_cal.asdf
//! archive:
//!   url: reference_files.tar.gz
//!   path: data/reference_files.tar.gz
//!   extract_to: data/reference
//! ```
//!
//! Built-in manifests ("presets") are embedded from the `presets/`
//! directory at compile time.

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PrepkitError, Result};

/// Embedded preset manifests.
static PRESETS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/presets");

/// Preset used when no manifest is given.
pub const DEFAULT_PRESET: &str = "roman-build13";

fn default_destination() -> PathBuf {
    PathBuf::from("data")
}

/// Auxiliary archive fetched after the main resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSpec {
    /// Absolute URL, or a path relative to the manifest's base URL.
    pub url: String,
    /// Where the downloaded archive is written.
    pub path: PathBuf,
    /// Directory the archive is unpacked into.
    pub extract_to: PathBuf,
}

/// Everything needed to mirror one set of remote files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataManifest {
    /// Base URL that resource paths are appended to.
    pub base_url: String,
    /// Local directory the files are written to.
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
    /// Remote paths, relative to `base_url`.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Optional archive fetched (and, from the CLI, unpacked) last.
    #[serde(default)]
    pub archive: Option<ArchiveSpec>,
    /// Overall per-request timeout; unset means no limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// One remote file and its local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    /// Path relative to the base URL.
    pub remote_path: String,
    /// Final segment of `remote_path`.
    pub local_name: String,
}

impl ResourceEntry {
    /// Build an entry, or `None` if the path has no final segment.
    pub fn new(remote_path: &str) -> Option<Self> {
        let local_name = remote_path.rsplit('/').next()?.trim();
        if local_name.is_empty() || local_name == "." || local_name == ".." {
            return None;
        }
        Some(Self {
            remote_path: remote_path.to_string(),
            local_name: local_name.to_string(),
        })
    }
}

impl DataManifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrepkitError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Load an embedded preset by name.
    pub fn preset(name: &str) -> Result<Self> {
        let file_name = format!("{}.yml", name);
        let file = PRESETS_DIR
            .get_file(&file_name)
            .ok_or_else(|| PrepkitError::UnknownPreset {
                name: name.to_string(),
            })?;
        let content = file
            .contents_utf8()
            .ok_or_else(|| PrepkitError::ConfigParseError {
                path: file.path().to_path_buf(),
                message: "Invalid UTF-8".to_string(),
            })?;
        Self::parse(content, file.path())
    }

    /// Names of all embedded presets, sorted.
    pub fn preset_names() -> Vec<String> {
        let mut names: Vec<String> = PRESETS_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "yml"))
            .filter_map(|f| f.path().file_stem()?.to_str().map(String::from))
            .collect();
        names.sort();
        names
    }

    fn parse(content: &str, origin: &Path) -> Result<Self> {
        let manifest: Self =
            serde_yaml::from_str(content).map_err(|e| PrepkitError::ConfigParseError {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the manifest for values that would make a sync misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(PrepkitError::ConfigValidationError {
                message: "base_url must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for remote_path in &self.resources {
            let entry =
                ResourceEntry::new(remote_path).ok_or_else(|| PrepkitError::ConfigValidationError {
                    message: format!("resource '{}' has no file name", remote_path),
                })?;
            if !seen.insert(entry.local_name.clone()) {
                return Err(PrepkitError::ConfigValidationError {
                    message: format!(
                        "resources share the local name '{}'",
                        entry.local_name
                    ),
                });
            }
        }

        if let Some(archive) = &self.archive {
            if archive.url.trim().is_empty() {
                return Err(PrepkitError::ConfigValidationError {
                    message: "archive url must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resource entries, in manifest order.
    pub fn entries(&self) -> Vec<ResourceEntry> {
        // validate() has already rejected paths without a file name.
        self.resources
            .iter()
            .filter_map(|p| ResourceEntry::new(p))
            .collect()
    }

    /// Full fetch address of a resource.
    pub fn resource_url(&self, entry: &ResourceEntry) -> String {
        join_url(&self.base_url, &entry.remote_path)
    }

    /// Full fetch address of the archive, if any.
    pub fn archive_url(&self) -> Option<String> {
        let archive = self.archive.as_ref()?;
        if archive.url.contains("://") {
            Some(archive.url.clone())
        } else {
            Some(join_url(&self.base_url, &archive.url))
        }
    }

    /// Resolve relative local paths against `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.destination = root.join(&self.destination);
        if let Some(archive) = &mut self.archive {
            archive.path = root.join(&archive.path);
            archive.extract_to = root.join(&archive.extract_to);
        }
        self
    }
}

/// Concatenate a base URL and a relative path with exactly one slash.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}
