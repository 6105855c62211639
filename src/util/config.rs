//! Configuration file support for gorun.
//!
//! gorun reads a single optional file, `<gorun-home>/config.toml`.
//! Every key is optional; missing keys fall back to built-in defaults.
//!
//! ```toml
//! [toolchain]
//! version = "1.23.1"
//! download_url = "https://go.dev/dl/"
//! sdk_dir = "/home/me/sdk"
//! root = "/usr/local/go"
//!
//! [cache]
//! dir = "/home/me/.gorun"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Go release used when the config does not pin one.
///
/// 1.22.7 did not work reliably on Windows.
pub const DEFAULT_GO_VERSION: &str = "1.23.1";

/// Base URL Go release archives are downloaded from.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://go.dev/dl/";

/// gorun configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain settings
    pub toolchain: ToolchainConfig,

    /// Binary cache settings
    pub cache: CacheConfig,
}

/// Toolchain provisioning settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Pinned Go version (e.g., "1.23.1")
    pub version: Option<String>,

    /// Base URL for release archives
    pub download_url: Option<String>,

    /// Directory holding provisioned toolchains (default: ~/sdk)
    pub sdk_dir: Option<PathBuf>,

    /// An existing Go installation to use instead of provisioning one
    pub root: Option<PathBuf>,
}

/// Binary cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding cached executables
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// The Go version to provision.
    pub fn go_version(&self) -> &str {
        self.toolchain
            .version
            .as_deref()
            .unwrap_or(DEFAULT_GO_VERSION)
    }

    /// The base URL for release archives.
    pub fn download_url(&self) -> &str {
        self.toolchain
            .download_url
            .as_deref()
            .unwrap_or(DEFAULT_DOWNLOAD_URL)
    }
}
