//! HTTP downloads.
//!
//! Responses are streamed into a temporary file created next to the final
//! destination, so the caller can rename it into place once the transfer
//! has completed.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Applies even when there is no overall timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Downloads files over HTTP/HTTPS.
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    /// Create a fetcher with no overall request timeout.
    ///
    /// Workshop data files run to hundreds of megabytes, so only the
    /// connection phase is bounded.
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Create a fetcher whose requests fail after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("prepkit/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, timeout })
    }

    /// Get the configured overall timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Download `url` into a new temporary file inside `dir`.
    ///
    /// The temporary file is deleted on drop unless persisted, so a failed
    /// transfer leaves nothing behind.
    pub fn download_to_temp(&self, url: &str, dir: &Path) -> Result<NamedTempFile> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        let bytes = response
            .copy_to(temp.as_file_mut())
            .with_context(|| format!("Failed to read response from {}", url))?;
        temp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to flush download of {}", url))?;

        tracing::debug!("Downloaded {} bytes from {}", bytes, url);
        Ok(temp)
    }
}
