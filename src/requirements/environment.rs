//! Environment file loading.
//!
//! Reads a conda-style `environment.yml` into a [`RequirementSet`]:
//!
//! ```yaml
//! name: workshop
//! dependencies:
//!   - python=3.11
//!   - numpy>=1.20
//!   - pip
//!   - pip:
//!       - romancal>=0.14
//! ```
//!
//! Top-level entries for the interpreter itself (`python`) and its
//! installer (`pip`) are dropped. Entries that do not parse are skipped
//! with a warning.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use super::requirement::Requirement;
use crate::error::{PrepkitError, Result};

/// Names that describe the runtime rather than a package to verify.
const EXCLUDED_NAMES: &[&str] = &["python", "pip"];

/// One item of the `dependencies` list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DependencyEntry {
    Spec(String),
    Nested(BTreeMap<String, Vec<String>>),
}

#[derive(Debug, Deserialize)]
struct EnvironmentFile {
    #[serde(default)]
    dependencies: Vec<DependencyEntry>,
}

/// Ordered requirements, unique by normalized name.
///
/// A later requirement for an already-listed package replaces the earlier
/// one in place.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    requirements: Vec<Requirement>,
    index: HashMap<String, usize>,
    skipped: Vec<String>,
}

impl RequirementSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load requirements from an environment file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PrepkitError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::parse_document(&content).map_err(|message| PrepkitError::ConfigParseError {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load requirements from an in-memory environment document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse_document(content).map_err(|message| PrepkitError::ConfigParseError {
            path: "<inline>".into(),
            message,
        })
    }

    /// Build a set from raw requirement strings, as found in a pip list.
    pub fn from_strings<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for spec in specs {
            set.add_spec(spec.as_ref());
        }
        set
    }

    fn parse_document(content: &str) -> std::result::Result<Self, String> {
        let file: EnvironmentFile = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        let mut set = Self::new();

        for entry in file.dependencies {
            match entry {
                DependencyEntry::Spec(spec) => {
                    if is_runtime_entry(&spec) {
                        tracing::debug!("Skipping runtime entry '{}'", spec);
                        continue;
                    }
                    set.add_spec(&spec);
                }
                DependencyEntry::Nested(map) => match map.get("pip") {
                    Some(pip_specs) => {
                        for spec in pip_specs {
                            set.add_spec(spec);
                        }
                    }
                    None => {
                        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                        tracing::warn!(
                            "Ignoring dependency mapping without a 'pip' key ({})",
                            keys.join(", ")
                        );
                    }
                },
            }
        }

        Ok(set)
    }

    /// Parse and add one requirement string, warning if it is malformed.
    ///
    /// Returns whether a requirement was registered.
    pub fn add_spec(&mut self, spec: &str) -> bool {
        match Requirement::parse(spec) {
            Some(requirement) => {
                self.insert(requirement);
                true
            }
            None => {
                tracing::warn!("Skipping unrecognized requirement '{}'", spec);
                self.skipped.push(spec.to_string());
                false
            }
        }
    }

    /// Insert a requirement, replacing any existing one with the same name.
    pub fn insert(&mut self, requirement: Requirement) {
        let key = requirement.key();
        match self.index.get(&key) {
            Some(&pos) => self.requirements[pos] = requirement,
            None => {
                self.index.insert(key, self.requirements.len());
                self.requirements.push(requirement);
            }
        }
    }

    /// Look up a requirement by (unnormalized) name.
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        let key = super::requirement::normalize_name(name);
        self.index.get(&key).map(|&pos| &self.requirements[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Entries that did not parse, in the order they were seen.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

fn is_runtime_entry(spec: &str) -> bool {
    match Requirement::parse(spec) {
        Some(req) => EXCLUDED_NAMES.contains(&req.key().as_str()),
        None => false,
    }
}
