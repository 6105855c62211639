//! Go toolchain provisioning.
//!
//! gorun builds packages with a private Go installation pinned to one
//! version, kept under the SDK directory:
//!
//! ```text
//! ~/sdk/
//! └── go1.23.1/
//!     └── bin/
//!         └── go
//! ```
//!
//! If the `go` executable exists at the expected root, the installation is
//! used as-is: there is no checksum or completeness check. Otherwise the
//! release archive is downloaded into a scoped temporary directory inside
//! the SDK directory, unpacked there, and its `go/` directory is renamed
//! into place. The temporary directory is removed on every exit path.
//!
//! Resolution happens at most once per [`Provisioner`]; the outcome,
//! success or failure, is memoized.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use url::Url;

use crate::core::error::GorunError;
use crate::core::platform::{exe_extension, GoPlatform};
use crate::util::config::Config;
use crate::util::fs::{ensure_dir, prepend_search_path};

mod archive;
mod download;

pub use archive::{extract_archive, extract_tarball};
pub use download::{Downloader, HttpDownloader};

/// A Go installation on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    root: PathBuf,
}

impl Toolchain {
    /// A toolchain rooted at `root` (GOROOT).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Toolchain { root: root.into() }
    }

    /// The installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding `go` and `gofmt`.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Path to the `go` executable.
    pub fn go_binary(&self) -> PathBuf {
        self.bin_dir().join(format!("go{}", exe_extension()))
    }

    /// Whether the `go` executable is present.
    pub fn is_installed(&self) -> bool {
        self.go_binary().is_file()
    }
}

/// Ensures a Go toolchain is available, installing it on first use.
pub struct Provisioner {
    /// Pinned Go version
    version: String,

    /// Directory provisioned toolchains live in
    sdk_dir: PathBuf,

    /// Base URL for release archives
    download_url: String,

    /// Platform whose archive is downloaded
    platform: GoPlatform,

    /// Existing installation to prefer over provisioning
    existing_root: Option<PathBuf>,

    /// Whether to prepend the toolchain's bin directory to PATH
    update_path: bool,

    downloader: Box<dyn Downloader>,

    /// Memoized outcome of the first resolution
    resolved: OnceLock<Result<Toolchain, String>>,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("version", &self.version)
            .field("sdk_dir", &self.sdk_dir)
            .field("download_url", &self.download_url)
            .field("platform", &self.platform)
            .field("existing_root", &self.existing_root)
            .field("resolved", &self.resolved.get())
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    /// Create a provisioner for the host platform.
    pub fn new(
        version: impl Into<String>,
        sdk_dir: impl Into<PathBuf>,
        downloader: Box<dyn Downloader>,
    ) -> Self {
        Provisioner {
            version: version.into(),
            sdk_dir: sdk_dir.into(),
            download_url: crate::util::config::DEFAULT_DOWNLOAD_URL.to_string(),
            platform: GoPlatform::host(),
            existing_root: None,
            update_path: true,
            downloader,
            resolved: OnceLock::new(),
        }
    }

    /// Create a provisioner from configuration.
    pub fn from_config(config: &Config, sdk_dir: PathBuf, downloader: Box<dyn Downloader>) -> Self {
        let mut provisioner = Provisioner::new(config.go_version(), sdk_dir, downloader)
            .with_download_url(config.download_url());
        provisioner.existing_root = config.toolchain.root.clone();
        provisioner
    }

    /// Set the base URL archives are downloaded from.
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = url.into();
        self
    }

    /// Set the target platform.
    pub fn with_platform(mut self, platform: GoPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Prefer an existing installation when its `go` executable exists.
    pub fn with_existing_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.existing_root = Some(root.into());
        self
    }

    /// Set whether a resolved toolchain is prepended to the process PATH.
    pub fn with_path_update(mut self, update_path: bool) -> Self {
        self.update_path = update_path;
        self
    }

    /// The pinned Go version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The SDK directory.
    pub fn sdk_dir(&self) -> &Path {
        &self.sdk_dir
    }

    /// Where the pinned version is (or will be) installed.
    pub fn expected_toolchain(&self) -> Toolchain {
        Toolchain::at(self.sdk_dir.join(format!("go{}", self.version)))
    }

    /// URL of the release archive for the pinned version and platform.
    pub fn archive_url(&self) -> Result<Url> {
        let mut base = self.download_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base = Url::parse(&base)
            .with_context(|| format!("invalid download URL: {}", self.download_url))?;
        let archive = self.platform.archive_name(&self.version);
        base.join(&archive)
            .with_context(|| format!("invalid archive URL for {}", archive))
    }

    /// Return the toolchain, provisioning it on first use.
    ///
    /// Only the first call does any work; later calls return the memoized
    /// toolchain or the memoized error.
    pub fn ensure_toolchain(&self) -> Result<&Toolchain, GorunError> {
        let resolved = self.resolved.get_or_init(|| {
            let result = self.resolve().map_err(|e| format!("{:#}", e));
            if let Ok(toolchain) = &result {
                if self.update_path {
                    prepend_to_process_path(&toolchain.bin_dir());
                }
            }
            result
        });

        resolved.as_ref().map_err(|message| GorunError::Bootstrap {
            version: self.version.clone(),
            message: message.clone(),
        })
    }

    fn resolve(&self) -> Result<Toolchain> {
        if let Some(root) = &self.existing_root {
            let existing = Toolchain::at(root);
            if existing.is_installed() {
                tracing::debug!("Using configured Go installation at {}", root.display());
                return Ok(existing);
            }
            tracing::warn!(
                "No go executable under configured root {}; provisioning Go {}",
                root.display(),
                self.version
            );
        }

        let toolchain = self.expected_toolchain();
        if toolchain.is_installed() {
            tracing::debug!("Go {} found at {}", self.version, toolchain.root().display());
            return Ok(toolchain);
        }

        self.install(&toolchain)?;
        Ok(toolchain)
    }

    /// Download and unpack the pinned release into `toolchain.root()`.
    fn install(&self, toolchain: &Toolchain) -> Result<()> {
        tracing::info!(
            "Installing Go {} ({}) into {}",
            self.version,
            self.platform,
            toolchain.root().display()
        );

        ensure_dir(&self.sdk_dir)?;

        // Inside the SDK directory so the final rename stays on one filesystem.
        let temp = tempfile::Builder::new()
            .prefix(".gorun-download-")
            .tempdir_in(&self.sdk_dir)
            .with_context(|| {
                format!("failed to create temporary directory in {}", self.sdk_dir.display())
            })?;

        let format = self.platform.archive_format();
        let archive = temp.path().join(format!("go.{}", format.extension()));
        let url = self.archive_url()?;
        self.downloader.download(url.as_str(), &archive)?;

        let unpacked = temp.path().join("unpacked");
        extract_archive(format, &archive, &unpacked)?;

        let extracted_root = unpacked.join("go");
        if !extracted_root.is_dir() {
            bail!("archive {} has no top-level `go` directory", url);
        }

        if let Err(e) = std::fs::rename(&extracted_root, toolchain.root()) {
            // Another process may have finished the same install first.
            if toolchain.is_installed() {
                tracing::debug!(
                    "Go {} was installed concurrently at {}",
                    self.version,
                    toolchain.root().display()
                );
            } else {
                return Err(e).with_context(|| {
                    format!(
                        "failed to move {} to {}",
                        extracted_root.display(),
                        toolchain.root().display()
                    )
                });
            }
        }

        tracing::info!("Installed Go {}", self.version);
        Ok(())
    }
}

/// Put `bin_dir` first on this process's PATH.
fn prepend_to_process_path(bin_dir: &Path) {
    let current = std::env::var_os("PATH");
    match prepend_search_path(bin_dir, current.as_deref()) {
        Some(path) => std::env::set_var("PATH", path),
        None => tracing::warn!(
            "Cannot add {} to PATH: it contains a path separator",
            bin_dir.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{go_distribution, FailingDownloader, StubDownloader};
    use tempfile::TempDir;

    fn provisioner(sdk_dir: &Path, downloader: Box<dyn Downloader>) -> Provisioner {
        Provisioner::new("1.23.1", sdk_dir, downloader)
            .with_platform(GoPlatform::new("linux", "amd64"))
            .with_path_update(false)
    }

    fn install_fake_go(root: &Path) {
        let toolchain = Toolchain::at(root);
        std::fs::create_dir_all(toolchain.bin_dir()).unwrap();
        std::fs::write(toolchain.go_binary(), "#!/bin/sh\n").unwrap();
    }

    fn sdk_entries(sdk_dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(sdk_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_expected_toolchain_paths() {
        let p = provisioner(Path::new("/home/me/sdk"), Box::new(FailingDownloader));
        let toolchain = p.expected_toolchain();

        assert_eq!(toolchain.root(), Path::new("/home/me/sdk/go1.23.1"));
        assert_eq!(toolchain.bin_dir(), Path::new("/home/me/sdk/go1.23.1/bin"));
        assert!(toolchain
            .go_binary()
            .starts_with("/home/me/sdk/go1.23.1/bin"));
    }

    #[test]
    fn test_archive_url() {
        let p = provisioner(Path::new("/sdk"), Box::new(FailingDownloader));
        assert_eq!(
            p.archive_url().unwrap().as_str(),
            "https://go.dev/dl/go1.23.1.linux-amd64.tar.gz"
        );

        let p = provisioner(Path::new("/sdk"), Box::new(FailingDownloader))
            .with_download_url("https://mirror.example.com/golang")
            .with_platform(GoPlatform::new("windows", "arm64"));
        assert_eq!(
            p.archive_url().unwrap().as_str(),
            "https://mirror.example.com/golang/go1.23.1.windows-arm64.zip"
        );
    }

    #[test]
    fn test_archive_url_invalid() {
        let p = provisioner(Path::new("/sdk"), Box::new(FailingDownloader))
            .with_download_url("not a url");
        assert!(p.archive_url().is_err());
    }

    #[test]
    fn test_present_toolchain_skips_download() {
        let tmp = TempDir::new().unwrap();
        let downloader = StubDownloader::serving(Vec::new());
        let calls = downloader.call_counter();
        let p = provisioner(tmp.path(), Box::new(downloader));
        install_fake_go(p.expected_toolchain().root());

        let toolchain = p.ensure_toolchain().unwrap();

        assert_eq!(toolchain.root(), tmp.path().join("go1.23.1"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_provision_from_archive() {
        let tmp = TempDir::new().unwrap();
        let downloader = StubDownloader::serving(go_distribution());
        let calls = downloader.call_counter();
        let urls = downloader.url_log();
        let p = provisioner(tmp.path(), Box::new(downloader));

        let toolchain = p.ensure_toolchain().unwrap();

        assert!(toolchain.is_installed());
        assert_eq!(toolchain.root(), tmp.path().join("go1.23.1"));
        assert_eq!(calls.get(), 1);
        assert_eq!(
            urls.entries(),
            vec!["https://go.dev/dl/go1.23.1.linux-amd64.tar.gz".to_string()]
        );

        // Temporary directory is gone; only the installed root remains.
        assert_eq!(sdk_entries(tmp.path()), vec!["go1.23.1".to_string()]);
    }

    #[test]
    fn test_provision_is_memoized() {
        let tmp = TempDir::new().unwrap();
        let downloader = StubDownloader::serving(go_distribution());
        let calls = downloader.call_counter();
        let p = provisioner(tmp.path(), Box::new(downloader));

        let first = p.ensure_toolchain().unwrap().clone();
        let second = p.ensure_toolchain().unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_download_failure_is_memoized_and_cleaned_up() {
        let tmp = TempDir::new().unwrap();
        let downloader = StubDownloader::failing("HTTP 503");
        let calls = downloader.call_counter();
        let p = provisioner(tmp.path(), Box::new(downloader));

        let err = p.ensure_toolchain().unwrap_err();
        assert!(matches!(err, GorunError::Bootstrap { .. }));
        assert!(err.to_string().contains("HTTP 503"));

        let again = p.ensure_toolchain().unwrap_err();
        assert_eq!(again.to_string(), err.to_string());
        assert_eq!(calls.get(), 1);

        assert!(!p.expected_toolchain().root().exists());
        assert!(sdk_entries(tmp.path()).is_empty());
    }

    #[test]
    fn test_archive_without_go_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let archive = crate::test_support::tarball(&[("golang/bin/go", b"".as_slice(), 0o755)]);
        let p = provisioner(tmp.path(), Box::new(StubDownloader::serving(archive)));

        let err = p.ensure_toolchain().unwrap_err();
        assert!(err.to_string().contains("no top-level `go` directory"));
        assert!(sdk_entries(tmp.path()).is_empty());
    }

    #[test]
    fn test_corrupt_archive_fails() {
        let tmp = TempDir::new().unwrap();
        let p = provisioner(
            tmp.path(),
            Box::new(StubDownloader::serving(b"<html>not found</html>".to_vec())),
        );

        assert!(p.ensure_toolchain().is_err());
        assert!(!p.expected_toolchain().is_installed());
        assert!(sdk_entries(tmp.path()).is_empty());
    }

    #[test]
    fn test_existing_root_preferred() {
        let tmp = TempDir::new().unwrap();
        let host_root = tmp.path().join("usr-local-go");
        install_fake_go(&host_root);

        let downloader = StubDownloader::serving(go_distribution());
        let calls = downloader.call_counter();
        let p = provisioner(&tmp.path().join("sdk"), Box::new(downloader))
            .with_existing_root(&host_root);

        assert_eq!(p.ensure_toolchain().unwrap().root(), host_root);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_broken_existing_root_falls_back() {
        let tmp = TempDir::new().unwrap();
        let downloader = StubDownloader::serving(go_distribution());
        let calls = downloader.call_counter();
        let p = provisioner(&tmp.path().join("sdk"), Box::new(downloader))
            .with_existing_root(tmp.path().join("missing"));

        let toolchain = p.ensure_toolchain().unwrap();
        assert_eq!(toolchain.root(), tmp.path().join("sdk").join("go1.23.1"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.toolchain.version = Some("1.22.5".to_string());
        config.toolchain.download_url = Some("https://mirror.example.com/go/".to_string());

        let p = Provisioner::from_config(&config, PathBuf::from("/sdk"), Box::new(FailingDownloader))
            .with_platform(GoPlatform::new("darwin", "arm64"));

        assert_eq!(p.version(), "1.22.5");
        assert_eq!(p.expected_toolchain().root(), Path::new("/sdk/go1.22.5"));
        assert_eq!(
            p.archive_url().unwrap().as_str(),
            "https://mirror.example.com/go/go1.22.5.darwin-arm64.tar.gz"
        );
    }
}
