//! Building Go packages into executables.
//!
//! This module drives `go install` with the provisioned toolchain.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::platform::exe_extension;
use crate::core::request::InstallRequest;
use crate::util::process::ProcessBuilder;

pub mod toolchain;

pub use toolchain::{Downloader, HttpDownloader, Provisioner, Toolchain};

/// Produces an executable for an install request.
pub trait PackageBuilder {
    /// Build `request` into `out_dir`, returning the executable's path.
    ///
    /// `out_dir` exists and is empty. Anything left in it on failure is
    /// discarded by the caller.
    fn build(&self, request: &InstallRequest, out_dir: &Path) -> Result<PathBuf>;
}

/// Builds packages with `go install`.
pub struct GoBuilder<'a> {
    provisioner: &'a Provisioner,
}

impl<'a> GoBuilder<'a> {
    /// Create a builder that provisions Go on first use.
    pub fn new(provisioner: &'a Provisioner) -> Self {
        GoBuilder { provisioner }
    }
}

impl PackageBuilder for GoBuilder<'_> {
    fn build(&self, request: &InstallRequest, out_dir: &Path) -> Result<PathBuf> {
        let toolchain = self.provisioner.ensure_toolchain()?;

        let cmd = install_command(&toolchain.go_binary(), request, out_dir);
        tracing::debug!("Running {}", cmd);
        cmd.run_and_check()?;

        let output = out_dir.join(format!(
            "{}{}",
            request.installed_binary_name(),
            exe_extension()
        ));
        if !output.is_file() {
            bail!(
                "`go install` succeeded but {} was not produced",
                output.display()
            );
        }
        Ok(output)
    }
}

/// The `go install` invocation for a request, writing into `gobin`.
pub fn install_command(go: &Path, request: &InstallRequest, gobin: &Path) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new(go).arg("install");
    if request.has_tags() {
        cmd = cmd.arg("-tags").arg(&request.tags);
    }
    cmd.arg(request.package.to_string()).env("GOBIN", gobin)
}
