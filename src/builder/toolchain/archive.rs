//! Release archive extraction.
//!
//! `.tar.gz` archives are unpacked in-process. `.zip` archives (Windows
//! releases) are handed to the host `tar`, which is bsdtar on Windows 10+
//! and understands zip.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::core::platform::ArchiveFormat;
use crate::util::process::{find_executable, ProcessBuilder};

/// Extract an archive file of the given format into `dest`.
pub fn extract_archive(format: ArchiveFormat, archive: &Path, dest: &Path) -> Result<()> {
    tracing::debug!("Extracting {} into {}", archive.display(), dest.display());

    let result = match format {
        ArchiveFormat::TarGz => {
            let file = File::open(archive)
                .with_context(|| format!("failed to open archive: {}", archive.display()))?;
            extract_tarball(BufReader::new(file), dest)
        }
        ArchiveFormat::Zip => extract_zip(archive, dest),
    };
    result.with_context(|| format!("failed to extract {}", archive.display()))
}

/// Extract a gzip-compressed tarball to a destination directory.
///
/// Entries that would land outside `dest` (absolute paths, `..`) are
/// skipped.
pub fn extract_tarball(data: impl Read, dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let mut archive = Archive::new(GzDecoder::new(data));

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    let mut extracted = 0usize;
    for entry in archive
        .entries()
        .context("failed to read tarball entries")?
    {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry
            .path()
            .context("failed to get entry path")?
            .to_string_lossy()
            .into_owned();

        let entry_type = entry.header().entry_type();
        match entry_type {
            tar::EntryType::Directory
            | tar::EntryType::Regular
            | tar::EntryType::Continuous
            | tar::EntryType::Symlink
            | tar::EntryType::Link => {
                let unpacked = entry
                    .unpack_in(dest)
                    .with_context(|| format!("failed to extract {}", entry_path))?;
                if unpacked {
                    extracted += 1;
                } else {
                    tracing::warn!("Skipping entry outside destination: {}", entry_path);
                }
            }
            _ => {
                // fifos, char devices, pax headers, ...
                tracing::debug!(
                    "Skipping unsupported entry type {:?}: {}",
                    entry_type,
                    entry_path
                );
            }
        }
    }

    tracing::debug!("Extracted {} entries into {}", extracted, dest.display());
    Ok(())
}

/// Extract a zip archive with the host `tar`.
fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let tar = find_executable("tar")
        .ok_or_else(|| anyhow!("`tar` not found in PATH; it is needed to unpack zip archives"))?;

    std::fs::create_dir_all(dest)
        .with_context(|| format!("failed to create destination directory: {}", dest.display()))?;

    ProcessBuilder::new(tar)
        .arg("-x")
        .arg("-f")
        .arg(archive)
        .arg("-C")
        .arg(dest)
        .run_and_check()
}
