//! Requirement status types.
//!
//! Each requirement check produces a `RequirementStatus` describing whether
//! the package is present and recent enough.

/// The result of checking a single requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementStatus {
    /// Installed, and at or above any minimum version.
    Satisfied {
        /// Installed version.
        installed: String,
    },

    /// Installed, but older than the minimum version.
    Outdated {
        /// Installed version.
        installed: String,
        /// Minimum version, as written in the requirement.
        required: String,
    },

    /// Installed, but the installed or required version could not be parsed.
    Unverifiable {
        /// Installed version.
        installed: String,
        /// Why the comparison failed.
        reason: String,
    },

    /// No installed distribution has this name.
    Missing,
}

impl RequirementStatus {
    /// Whether the requirement is satisfied.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, RequirementStatus::Satisfied { .. })
    }

    /// Human-readable status line for the named package.
    pub fn describe(&self, name: &str) -> String {
        match self {
            Self::Satisfied { installed } => {
                format!("\"{}\" is installed ({})", name, installed)
            }
            Self::Outdated {
                installed,
                required,
            } => format!(
                "\"{}\" is installed ({}) but out of date ({} required)",
                name, installed, required
            ),
            Self::Unverifiable { installed, reason } => format!(
                "\"{}\" is installed ({}) but its version could not be compared: {}",
                name, installed, reason
            ),
            Self::Missing => format!("\"{}\" is not installed", name),
        }
    }
}

/// The result of checking one requirement.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Requirement name as written.
    pub requirement: String,
    /// The status of the requirement.
    pub status: RequirementStatus,
}

impl CheckResult {
    /// Status line for this result.
    pub fn describe(&self) -> String {
        self.status.describe(&self.requirement)
    }
}

/// Results for a whole requirement set, in requirement order.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
}

impl CheckReport {
    /// Names of every unmet requirement.
    pub fn unmet(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.status.is_satisfied())
            .map(|r| r.requirement.as_str())
            .collect()
    }

    /// Whether every requirement is satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.results.iter().all(|r| r.status.is_satisfied())
    }

    /// Final summary line.
    pub fn summary(&self) -> String {
        match self.unmet().len() {
            0 => "Your Python environment is good to go!".to_string(),
            1 => "You must resolve 1 error (above) before running the tutorials.".to_string(),
            n => format!(
                "You must resolve {} errors (above) before running the tutorials.",
                n
            ),
        }
    }
}
