//! Workshop data staging.
//!
//! This module mirrors fixed lists of remote data files into a local
//! directory, fetching only what is missing.
//!
//! # Modules
//!
//! - [`manifest`] - Manifest format, validation, and embedded presets
//! - [`fetcher`] - The fetch-if-missing sync loop
//! - [`http`] - HTTP downloads into temporary files
//! - [`archive`] - Auxiliary archive extraction

pub mod archive;
pub mod fetcher;
pub mod http;
pub mod manifest;

pub use archive::{extract_archive, ArchiveFormat};
pub use fetcher::{DataFetcher, SyncReport};
pub use http::HttpFetcher;
pub use manifest::{ArchiveSpec, DataManifest, ResourceEntry, DEFAULT_PRESET};
