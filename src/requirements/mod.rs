//! Python dependency verification.
//!
//! This module checks whether the packages listed in an environment file
//! are installed, and recent enough, in a Python environment.
//!
//! # Modules
//!
//! - [`environment`] - Environment file loading into a requirement set
//! - [`requirement`] - Requirement string parsing
//! - [`version`] - PEP 440 version parsing and ordering
//! - [`installed`] - Installed distribution discovery
//! - [`checker`] - Requirement evaluation
//! - [`status`] - Per-requirement results and the aggregate report
//!
//! # Example
//!
//! ```
//! use prepkit::requirements::{InstalledPackages, RequirementChecker, RequirementSet};
//!
//! let requirements = RequirementSet::from_strings(["numpy>=1.20", "scipy"]);
//! let installed = InstalledPackages::from_pairs([("numpy", "1.19.0")]);
//!
//! let report = RequirementChecker::new(&installed).check_all(&requirements);
//! assert_eq!(report.unmet(), vec!["numpy", "scipy"]);
//! ```

pub mod checker;
pub mod environment;
pub mod installed;
pub mod requirement;
pub mod status;
pub mod version;

pub use checker::RequirementChecker;
pub use environment::RequirementSet;
pub use installed::{InstalledPackage, InstalledPackages};
pub use requirement::{normalize_name, Operator, Requirement, Specifier};
pub use status::{CheckReport, CheckResult, RequirementStatus};
pub use version::Version;
