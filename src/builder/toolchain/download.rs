//! Release archive downloads.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Fetches a URL into a local file.
pub trait Downloader {
    /// Download `url` to `dest`, replacing any existing file.
    fn download(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Downloader backed by a blocking HTTP client.
///
/// The client is built per download, so a launch that never downloads
/// never starts the client's background runtime.
#[derive(Debug, Default)]
pub struct HttpDownloader;

impl HttpDownloader {
    /// Create a new HTTP downloader.
    pub fn new() -> Self {
        HttpDownloader
    }

    fn client(&self) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .user_agent(concat!("gorun/", env!("CARGO_PKG_VERSION")))
            // Release archives are large; no overall deadline.
            .timeout(None)
            .build()
            .context("failed to create HTTP client")
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!("Downloading {}", url);

        let client = self.client()?;
        let mut response = client
            .get(url)
            .send()
            .with_context(|| format!("failed to download {}", url))?;

        if !response.status().is_success() {
            bail!("failed to download {}: HTTP {}", url, response.status());
        }

        let file = File::create(dest)
            .with_context(|| format!("failed to create file: {}", dest.display()))?;

        let pb = download_progress(response.content_length());
        let mut writer = pb.wrap_write(BufWriter::new(file));

        let bytes = response
            .copy_to(&mut writer)
            .with_context(|| format!("failed to read response body from {}", url))?;
        writer
            .flush()
            .with_context(|| format!("failed to write file: {}", dest.display()))?;
        pb.finish_and_clear();

        tracing::debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(())
    }
}

/// Progress bar on stderr. indicatif hides it when stderr is not a terminal.
fn download_progress(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.set_message("Downloading");
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_message("Downloading");
            pb
        }
    }
}
