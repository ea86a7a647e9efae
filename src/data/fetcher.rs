//! Fetch-if-missing synchronization.
//!
//! `DataFetcher` walks a manifest's resources in order and downloads each
//! one whose destination file is absent (or every one, when overwriting).
//! Existence of the destination file is the only signal consulted.
//!
//! Downloads land in a temporary file inside the destination directory and
//! are renamed into place once complete, so an interrupted transfer never
//! leaves a truncated file under the final name.
//!
//! Any transport error aborts the sync. Files fetched before the failure
//! stay in place.

use std::fs;
use std::path::{Path, PathBuf};

use super::http::HttpFetcher;
use super::manifest::DataManifest;
use crate::error::Result;
use crate::ui::UserInterface;

/// What a sync did.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Files downloaded during this run, in order.
    pub fetched: Vec<PathBuf>,
    /// Files left alone because they already existed.
    pub skipped: Vec<PathBuf>,
    /// Where the auxiliary archive was written, if the manifest has one.
    pub archive: Option<PathBuf>,
}

impl SyncReport {
    /// Number of network requests made.
    pub fn requests(&self) -> usize {
        self.fetched.len() + usize::from(self.archive.is_some())
    }
}

/// Mirrors a manifest's resources into its destination directory.
pub struct DataFetcher<'a> {
    http: &'a HttpFetcher,
    manifest: &'a DataManifest,
}

impl<'a> DataFetcher<'a> {
    /// Create a fetcher for `manifest`.
    ///
    /// Local paths in the manifest are used as-is; see
    /// [`DataManifest::rooted_at`].
    pub fn new(http: &'a HttpFetcher, manifest: &'a DataManifest) -> Self {
        Self { http, manifest }
    }

    /// Ensure every resource exists locally, then fetch the archive.
    ///
    /// The archive is written but never extracted here; unpacking is left
    /// to the caller.
    pub fn sync(&self, overwrite: bool, ui: &mut dyn UserInterface) -> Result<SyncReport> {
        let destination = &self.manifest.destination;
        fs::create_dir_all(destination)?;

        let mut report = SyncReport::default();

        for entry in self.manifest.entries() {
            let local_path = destination.join(&entry.local_name);

            if !overwrite && local_path.exists() {
                tracing::debug!("{} exists, skipping", local_path.display());
                if ui.output_mode().lists_skipped() {
                    ui.message(&format!("skipping \"{}\" (already present)", entry.remote_path));
                }
                report.skipped.push(local_path);
                continue;
            }

            ui.message(&format!("downloading \"{}\"", entry.remote_path));
            let url = self.manifest.resource_url(&entry);
            self.download(&url, &local_path)?;
            report.fetched.push(local_path);
        }

        if let (Some(archive), Some(url)) = (&self.manifest.archive, self.manifest.archive_url()) {
            ui.message(&format!("downloading \"{}\"", url));
            if let Some(parent) = archive.path.parent() {
                fs::create_dir_all(parent)?;
            }
            self.download(&url, &archive.path)?;
            report.archive = Some(archive.path.clone());
        }

        ui.success("Done downloading files");
        Ok(report)
    }

    fn download(&self, url: &str, local_path: &Path) -> Result<()> {
        let staging_dir = match local_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let temp = self.http.download_to_temp(url, staging_dir)?;
        temp.persist(local_path).map_err(|e| e.error)?;
        tracing::debug!("Saved {}", local_path.display());
        Ok(())
    }
}
