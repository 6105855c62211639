//! Global context for gorun operations.
//!
//! Resolves where everything lives and owns the per-process toolchain
//! provisioner.
//!
//! ```text
//! ~/.gorun/            gorun home (GORUN_HOME)
//! ├── config.toml
//! └── <cache entries>  cache directory (cache.dir)
//! ~/sdk/go1.23.1/      toolchain root (toolchain.sdk_dir)
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::builder::{GoBuilder, HttpDownloader, Provisioner};
use crate::util::config::Config;

/// Name of the gorun home directory under the user's home.
const HOME_DIR_NAME: &str = ".gorun";

/// Global context containing configuration and paths.
#[derive(Debug)]
pub struct GlobalContext {
    /// Directory holding cached executables
    cache_dir: PathBuf,

    /// Toolchain provisioner, resolved at most once
    provisioner: Provisioner,
}

impl GlobalContext {
    /// Create a context from the environment.
    ///
    /// `home_override` replaces `~/.gorun` (the CLI passes `GORUN_HOME`).
    /// `<home>/config.toml` is read if present.
    pub fn new(home_override: Option<PathBuf>) -> Result<Self> {
        let user_home = BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or_else(|| anyhow!("could not determine the user's home directory"))?;

        let home = home_override.unwrap_or_else(|| user_home.join(HOME_DIR_NAME));
        let config = Config::load_or_default(&home.join("config.toml"));
        let sdk_dir = config
            .toolchain
            .sdk_dir
            .clone()
            .unwrap_or_else(|| user_home.join("sdk"));

        Ok(Self::with_config(&home, sdk_dir, &config))
    }

    /// Create a context with explicit paths and configuration.
    pub fn with_config(home: &Path, sdk_dir: PathBuf, config: &Config) -> Self {
        let cache_dir = config
            .cache
            .dir
            .clone()
            .unwrap_or_else(|| home.to_path_buf());
        let provisioner = Provisioner::from_config(config, sdk_dir, Box::new(HttpDownloader::new()));

        GlobalContext {
            cache_dir,
            provisioner,
        }
    }

    /// Get the executable cache directory.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get the directory provisioned toolchains live in.
    pub fn sdk_dir(&self) -> &Path {
        self.provisioner.sdk_dir()
    }

    /// Get the toolchain provisioner.
    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }

    /// A builder using this context's toolchain.
    pub fn builder(&self) -> GoBuilder<'_> {
        GoBuilder::new(&self.provisioner)
    }
}
