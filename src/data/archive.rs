//! Archive extraction.
//!
//! The format is inferred from the file name: `.tar.gz`/`.tgz`, `.tar`,
//! or `.zip`. Extraction always overwrites whatever is already in the
//! target directory.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tar::Archive;
use zip::ZipArchive;

use crate::error::{PrepkitError, Result};

/// Supported archive layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Tar,
    Zip,
}

impl ArchiveFormat {
    /// Infer the format from a file name.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Unpack `archive_path` into `destination`, creating it if needed.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<()> {
    let format = ArchiveFormat::from_path(archive_path).ok_or_else(|| PrepkitError::Archive {
        path: archive_path.to_path_buf(),
        message: "unsupported archive format".to_string(),
    })?;

    tracing::debug!(
        "Extracting {} ({:?}) into {}",
        archive_path.display(),
        format,
        destination.display()
    );

    fs::create_dir_all(destination)?;
    let file = File::open(archive_path)?;

    let outcome = match format {
        ArchiveFormat::TarGz => Archive::new(GzDecoder::new(file)).unpack(destination),
        ArchiveFormat::Tar => Archive::new(file).unpack(destination),
        ArchiveFormat::Zip => extract_zip(file, destination),
    };

    outcome.map_err(|e| PrepkitError::Archive {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    })
}

fn extract_zip(file: File, destination: &Path) -> io::Result<()> {
    let mut archive = ZipArchive::new(file).map_err(io::Error::other)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(io::Error::other)?;
        // Entries escaping the destination are skipped.
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("Skipping unsafe zip entry '{}'", entry.name());
            continue;
        };
        let out_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)?;
        io::copy(&mut entry, &mut out_file)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn build_tar_gz(path: &Path) {
        let file = File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let body = b"reference data";
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "crds/mappings/roman.pmap", &body[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn build_zip(path: &Path) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        writer.add_directory("refs/", options).unwrap();
        writer.start_file("refs/distortion.asdf", options).unwrap();
        writer.write_all(b"#ASDF 1.0.0").unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn infers_format_from_name() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("crds.tar.gz")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("CRDS.TGZ")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("crds.tar")),
            Some(ArchiveFormat::Tar)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("refs.zip")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("refs.7z")), None);
    }

    #[test]
    fn extracts_tar_gz() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("crds.tar.gz");
        build_tar_gz(&archive);

        let target = temp.path().join("out");
        extract_archive(&archive, &target).unwrap();

        let content = fs::read_to_string(target.join("crds/mappings/roman.pmap")).unwrap();
        assert_eq!(content, "reference data");
    }

    #[test]
    fn extraction_is_repeatable() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("crds.tgz");
        build_tar_gz(&archive);

        let target = temp.path().join("out");
        extract_archive(&archive, &target).unwrap();
        fs::write(target.join("crds/mappings/roman.pmap"), "edited").unwrap();
        extract_archive(&archive, &target).unwrap();

        let content = fs::read_to_string(target.join("crds/mappings/roman.pmap")).unwrap();
        assert_eq!(content, "reference data");
    }

    #[test]
    fn extracts_zip() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("refs.zip");
        build_zip(&archive);

        let target = temp.path().join("out");
        extract_archive(&archive, &target).unwrap();

        let content = fs::read_to_string(target.join("refs/distortion.asdf")).unwrap();
        assert_eq!(content, "#ASDF 1.0.0");
    }

    #[test]
    fn unsupported_format_is_an_error() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("refs.rar");
        fs::write(&archive, b"not an archive").unwrap();

        let err = extract_archive(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, PrepkitError::Archive { .. }));
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract_archive(&archive, &temp.path().join("out")).unwrap_err();
        assert!(matches!(err, PrepkitError::Archive { .. }));
    }
}
