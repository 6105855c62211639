//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file if it exists. A missing file is not an error.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove file: {}", path.display()))
        }
    }
}

/// Rename `from` to `to`, with both paths in the error message.
pub fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).with_context(|| {
        format!("failed to rename {} to {}", from.display(), to.display())
    })
}

/// Prepend a directory to a `PATH`-style search list.
///
/// Returns `None` if the directory contains the platform's list separator.
pub fn prepend_search_path(dir: &Path, current: Option<&std::ffi::OsStr>) -> Option<std::ffi::OsString> {
    let mut paths: Vec<PathBuf> = vec![dir.to_path_buf()];
    if let Some(current) = current {
        paths.extend(std::env::split_paths(current));
    }
    std::env::join_paths(paths).ok()
}

/// Mark a file as executable (no-op on non-Unix platforms).
#[cfg(unix)]
pub fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
