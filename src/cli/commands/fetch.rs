//! Fetch command implementation.
//!
//! The `prepkit fetch` command stages workshop data files locally and
//! unpacks the manifest's auxiliary archive, if it has one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::FetchArgs;
use crate::data::{extract_archive, DataFetcher, DataManifest, HttpFetcher, DEFAULT_PRESET};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Manifest picked up from the workshop root when no source is given.
const LOCAL_MANIFEST_FILE: &str = "data.yml";

/// The fetch command implementation.
pub struct FetchCommand {
    project_root: PathBuf,
    args: FetchArgs,
}

impl FetchCommand {
    /// Create a new fetch command.
    pub fn new(project_root: &Path, args: FetchArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Get the workshop root.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the command arguments.
    pub fn args(&self) -> &FetchArgs {
        &self.args
    }

    /// Resolve the manifest to sync, with local paths rooted at the workshop.
    ///
    /// Order: `--manifest`, `--preset`, `data.yml` in the workshop root,
    /// then the default preset.
    fn load_manifest(&self) -> Result<DataManifest> {
        let mut manifest = if let Some(path) = &self.args.manifest {
            DataManifest::load(&self.project_root.join(path))?
        } else if let Some(name) = &self.args.preset {
            DataManifest::preset(name)?
        } else {
            let local = self.project_root.join(LOCAL_MANIFEST_FILE);
            if local.exists() {
                DataManifest::load(&local)?
            } else {
                tracing::debug!("No {} found, using preset {}", LOCAL_MANIFEST_FILE, DEFAULT_PRESET);
                DataManifest::preset(DEFAULT_PRESET)?
            }
        };

        if let Some(dest) = &self.args.dest {
            manifest.destination = dest.clone();
        }

        Ok(manifest.rooted_at(&self.project_root))
    }
}

impl Command for FetchCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let manifest = self.load_manifest()?;
        tracing::debug!(
            "Syncing {} resources from {} into {}",
            manifest.resources.len(),
            manifest.base_url,
            manifest.destination.display()
        );

        let http = match manifest.timeout_secs {
            Some(secs) => HttpFetcher::with_timeout(Duration::from_secs(secs))?,
            None => HttpFetcher::new()?,
        };

        let report = DataFetcher::new(&http, &manifest).sync(self.args.overwrite, ui)?;
        tracing::debug!(
            "Fetched {}, skipped {}",
            report.fetched.len(),
            report.skipped.len()
        );

        if self.args.no_extract {
            return Ok(CommandResult::success());
        }

        if let (Some(archive_path), Some(archive)) = (&report.archive, &manifest.archive) {
            let name = archive_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| archive_path.display().to_string());

            let mut spinner = ui.start_spinner(&format!("Extracting {}", name));
            match extract_archive(archive_path, &archive.extract_to) {
                Ok(()) => spinner.finish_success(&format!(
                    "Extracted {} into {}",
                    name,
                    archive.extract_to.display()
                )),
                Err(e) => {
                    spinner.finish_error(&format!("Failed to extract {}", name));
                    return Err(e);
                }
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepkitError;
    use crate::ui::{MockUI, SpinnerStatus};
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use httpmock::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(root: &Path, server: &MockServer, with_archive: bool) {
        let mut manifest = format!(
            "base_url: {}\ndestination: data\nresources:\n  - ExampleData/a_cal.asdf\n  - ExampleData/b_uncal.asdf\n",
            server.url("/workshop/")
        );
        if with_archive {
            manifest.push_str(
                "archive:\n  url: refs/crds.tar.gz\n  path: data/crds.tar.gz\n  extract_to: data/crds\n",
            );
        }
        fs::write(root.join("data.yml"), manifest).unwrap();
    }

    fn mock_resources(server: &MockServer) {
        for name in ["a_cal.asdf", "b_uncal.asdf"] {
            server.mock(|when, then| {
                when.method(GET).path(format!("/workshop/ExampleData/{}", name));
                then.status(200).body(name);
            });
        }
    }

    fn tarball() -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        let body = b"context: roman";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "mappings/roman.pmap", &body[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn fetches_from_local_manifest() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        write_manifest(temp.path(), &server, false);
        mock_resources(&server);

        let cmd = FetchCommand::new(temp.path(), FetchArgs::default());
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert_eq!(ui.messages().len(), 2);
        assert!(ui.has_success("Done downloading files"));
        assert_eq!(
            fs::read_to_string(temp.path().join("data/a_cal.asdf")).unwrap(),
            "a_cal.asdf"
        );
    }

    #[test]
    fn dest_overrides_manifest_destination() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        write_manifest(temp.path(), &server, false);
        mock_resources(&server);

        let cmd = FetchCommand::new(
            temp.path(),
            FetchArgs {
                dest: Some(PathBuf::from("elsewhere")),
                ..Default::default()
            },
        );
        cmd.execute(&mut MockUI::new()).unwrap();

        assert!(temp.path().join("elsewhere/b_uncal.asdf").exists());
        assert!(!temp.path().join("data").exists());
    }

    #[test]
    fn archive_is_extracted() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        write_manifest(temp.path(), &server, true);
        mock_resources(&server);
        server.mock(|when, then| {
            when.method(GET).path("/workshop/refs/crds.tar.gz");
            then.status(200).body(tarball());
        });

        let cmd = FetchCommand::new(temp.path(), FetchArgs::default());
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        let extracted = temp.path().join("data/crds/mappings/roman.pmap");
        assert_eq!(fs::read_to_string(extracted).unwrap(), "context: roman");
        let spinners = ui.spinners();
        assert_eq!(spinners.len(), 1);
        assert_eq!(spinners[0].status(), Some(SpinnerStatus::Success));
    }

    #[test]
    fn no_extract_leaves_archive_packed() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        write_manifest(temp.path(), &server, true);
        mock_resources(&server);
        server.mock(|when, then| {
            when.method(GET).path("/workshop/refs/crds.tar.gz");
            then.status(200).body(tarball());
        });

        let cmd = FetchCommand::new(
            temp.path(),
            FetchArgs {
                no_extract: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        assert!(temp.path().join("data/crds.tar.gz").exists());
        assert!(!temp.path().join("data/crds").exists());
        assert!(ui.spinners().is_empty());
    }

    #[test]
    fn corrupt_archive_reports_failure() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        write_manifest(temp.path(), &server, true);
        mock_resources(&server);
        server.mock(|when, then| {
            when.method(GET).path("/workshop/refs/crds.tar.gz");
            then.status(200).body("not a tarball");
        });

        let cmd = FetchCommand::new(temp.path(), FetchArgs::default());
        let mut ui = MockUI::new();
        let err = cmd.execute(&mut ui).unwrap_err();

        assert!(matches!(err, PrepkitError::Archive { .. }));
        assert_eq!(ui.spinners()[0].status(), Some(SpinnerStatus::Error));
    }

    #[test]
    fn server_error_propagates() {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start();
        write_manifest(temp.path(), &server, false);
        server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });

        let cmd = FetchCommand::new(temp.path(), FetchArgs::default());
        let mut ui = MockUI::new();
        assert!(cmd.execute(&mut ui).is_err());
        assert!(!ui.has_success("Done downloading files"));
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let temp = TempDir::new().unwrap();
        let cmd = FetchCommand::new(
            temp.path(),
            FetchArgs {
                preset: Some("no-such-workshop".to_string()),
                ..Default::default()
            },
        );
        let err = cmd.execute(&mut MockUI::new()).unwrap_err();
        assert!(matches!(err, PrepkitError::UnknownPreset { .. }));
    }

    #[test]
    fn default_preset_used_without_local_manifest() {
        let temp = TempDir::new().unwrap();
        let cmd = FetchCommand::new(temp.path(), FetchArgs::default());
        let manifest = cmd.load_manifest().unwrap();

        assert_eq!(manifest.destination, temp.path().join("data"));
        assert_eq!(manifest.resources.len(), 12);
    }

    #[test]
    fn explicit_manifest_path_is_rooted() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("custom.yml"),
            "base_url: https://example.org/\ndestination: out\nresources:\n  - x.fits\n",
        )
        .unwrap();

        let cmd = FetchCommand::new(
            temp.path(),
            FetchArgs {
                manifest: Some(PathBuf::from("custom.yml")),
                ..Default::default()
            },
        );
        let manifest = cmd.load_manifest().unwrap();
        assert_eq!(manifest.destination, temp.path().join("out"));
    }
}
