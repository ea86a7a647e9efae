//! Requirement evaluation.
//!
//! The `RequirementChecker` compares a [`RequirementSet`] against an
//! [`InstalledPackages`] snapshot. Only minimum versions are enforced.

use super::environment::RequirementSet;
use super::installed::InstalledPackages;
use super::requirement::Requirement;
use super::status::{CheckReport, CheckResult, RequirementStatus};
use super::version::Version;

/// Checks requirements against a snapshot of installed packages.
pub struct RequirementChecker<'a> {
    installed: &'a InstalledPackages,
}

impl<'a> RequirementChecker<'a> {
    /// Create a checker over an installed-package snapshot.
    pub fn new(installed: &'a InstalledPackages) -> Self {
        Self { installed }
    }

    /// Check every requirement, in order.
    pub fn check_all(&self, requirements: &RequirementSet) -> CheckReport {
        let results = requirements
            .iter()
            .map(|req| CheckResult {
                requirement: req.name.clone(),
                status: self.check(req),
            })
            .collect();
        CheckReport { results }
    }

    /// Check a single requirement.
    pub fn check(&self, requirement: &Requirement) -> RequirementStatus {
        let Some(package) = self.installed.get(&requirement.name) else {
            return RequirementStatus::Missing;
        };
        let installed = package.version.clone();

        let (required, minimum) = match requirement.minimum() {
            Ok(Some(floor)) => floor,
            Ok(None) => return RequirementStatus::Satisfied { installed },
            Err(e) => {
                return RequirementStatus::Unverifiable {
                    installed,
                    reason: e.to_string(),
                }
            }
        };

        let current = match Version::parse(&installed) {
            Ok(v) => v,
            Err(e) => {
                return RequirementStatus::Unverifiable {
                    installed,
                    reason: e.to_string(),
                }
            }
        };

        if current < minimum {
            tracing::debug!(
                "{}: {} < {}",
                requirement.name,
                current,
                minimum
            );
            RequirementStatus::Outdated {
                installed,
                required,
            }
        } else {
            RequirementStatus::Satisfied { installed }
        }
    }
}
