//! prepkit - Setup utilities for hands-on science workshops.
//!
//! prepkit checks that a participant's Python environment satisfies the
//! workshop's `environment.yml`, and stages the workshop's data files
//! into a local directory, fetching only what is missing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`data`] - Data manifests, downloads, and archive extraction
//! - [`error`] - Error types and result aliases
//! - [`requirements`] - Requirement parsing and installed-version checks
//! - [`ui`] - Status lines, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use prepkit::data::{DataManifest, DEFAULT_PRESET};
//!
//! // Built-in manifests are embedded in the binary
//! let manifest = DataManifest::preset(DEFAULT_PRESET).unwrap();
//! assert!(!manifest.resources.is_empty());
//! ```
//!
//! For fetching against a live server, see the integration tests.

pub mod cli;
pub mod data;
pub mod error;
pub mod requirements;
pub mod ui;

pub use error::{PrepkitError, Result};
