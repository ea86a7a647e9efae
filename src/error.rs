//! Error types for prepkit operations.
//!
//! This module defines [`PrepkitError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `PrepkitError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `PrepkitError::Other`) for transport errors
//! - Unmet requirements are not errors; they are reported by the checker

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for prepkit operations.
#[derive(Debug, Error)]
pub enum PrepkitError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// No embedded data manifest with this name.
    #[error("Unknown preset: {name}")]
    UnknownPreset { name: String },

    /// A version string is not a valid package version.
    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    /// The Python interpreter could not be queried for its search path.
    #[error("Failed to inspect Python environment via '{interpreter}': {message}")]
    EnvironmentInspection { interpreter: String, message: String },

    /// Archive could not be unpacked.
    #[error("Failed to extract {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for prepkit operations.
pub type Result<T> = std::result::Result<T, PrepkitError>;
