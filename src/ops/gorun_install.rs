//! Resolving a package to a cached executable, building it on a miss.
//!
//! The cache is a flat directory of executables named by cache key:
//!
//! ```text
//! ~/.gorun/
//! ├── stringer@v0.11.0
//! └── stringer@v0.11.0-3f2a9c1
//! ```
//!
//! An entry is published by renaming a finished build over the final name,
//! so a present entry is always a complete executable. A crashed or failed
//! build leaves nothing behind under the final name. A killed build can
//! leave its `.gorun-build-*` staging directory; those are swept once they
//! are a day old.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::builder::PackageBuilder;
use crate::core::error::GorunError;
use crate::core::platform::exe_extension;
use crate::core::request::InstallRequest;
use crate::util::fs::{ensure_dir, remove_file_if_exists, rename};

/// Prefix of per-build staging directories inside the cache directory.
const STAGING_PREFIX: &str = ".gorun-build-";

/// Staging directories older than this belong to builds that died.
const STALE_STAGING_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Where the executable for `request` lives in `cache_dir`.
pub fn cached_executable_path(cache_dir: &Path, request: &InstallRequest) -> PathBuf {
    cache_dir.join(request.cache_key().file_name(exe_extension()))
}

/// Return the cached executable for `request`, building it first if needed.
///
/// A cache hit returns immediately without consulting `builder`. On a miss
/// the package is built into a staging directory inside `cache_dir` and
/// then moved into place.
pub fn ensure_installed(
    cache_dir: &Path,
    request: &InstallRequest,
    builder: &dyn PackageBuilder,
) -> Result<PathBuf> {
    let candidate = cached_executable_path(cache_dir, request);
    if candidate.exists() {
        tracing::debug!("Using cached {}", candidate.display());
        return Ok(candidate);
    }

    tracing::info!("Installing {}", request.package);
    if request.has_tags() {
        tracing::info!("Build tags: {}", request.tags);
    }

    ensure_dir(cache_dir)?;
    sweep_stale_staging(cache_dir, STALE_STAGING_AGE);

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(cache_dir)
        .with_context(|| {
            format!("failed to create staging directory in {}", cache_dir.display())
        })?;

    if request.verbose {
        tracing::debug!("Cache key: {}", request.cache_key());
        tracing::debug!("Staging directory: {}", staging.path().display());
    }

    let built = builder
        .build(request, staging.path())
        .map_err(|e| install_error(request, e))?;

    // Replaces a file left by a concurrent install of the same key.
    remove_file_if_exists(&candidate)?;
    rename(&built, &candidate)?;

    tracing::debug!("Cached {}", candidate.display());
    Ok(candidate)
}

/// Remove staging directories in `cache_dir` last modified more than
/// `older_than` ago. Failures are logged and otherwise ignored.
fn sweep_stale_staging(cache_dir: &Path, older_than: Duration) {
    let entries = match std::fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot scan {} for stale builds: {}", cache_dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
            continue;
        }
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok());
        if !matches!(age, Some(age) if age >= older_than) {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_dir_all(&path) {
            Ok(()) => tracing::debug!("Removed stale staging directory {}", path.display()),
            Err(e) => tracing::warn!(
                "Failed to remove stale staging directory {}: {}",
                path.display(),
                e
            ),
        }
    }
}

/// Classify a builder failure: toolchain problems keep their identity,
/// everything else is a build failure of this package.
fn install_error(request: &InstallRequest, err: anyhow::Error) -> GorunError {
    let package = &request.package;
    match err.downcast::<GorunError>() {
        Ok(err @ GorunError::Bootstrap { .. }) => err,
        Ok(err) => GorunError::build(&package.path, &package.version, &anyhow::Error::new(err)),
        Err(err) => GorunError::build(&package.path, &package.version, &err),
    }
}
