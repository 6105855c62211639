//! Test doubles and fixtures for gorun unit tests.
//!
//! The stubs stand in for the network and the Go toolchain so provisioning
//! and caching can be exercised against a temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use gorun::test_support::{go_distribution, StubDownloader};
//!
//! #[test]
//! fn test_example() {
//!     let downloader = StubDownloader::serving(go_distribution());
//!     let calls = downloader.call_counter();
//!     // hand `downloader` to a Provisioner, then check `calls.get()`
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::builder::toolchain::Downloader;
use crate::builder::PackageBuilder;
use crate::core::error::GorunError;
use crate::core::platform::exe_extension;
use crate::core::request::InstallRequest;

/// Build a gzip-compressed tarball from `(path, contents, mode)` entries.
pub fn tarball(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let encoder = GzEncoder::new(Vec::new(), Compression::fast());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(*mode);
        header.set_entry_type(tar::EntryType::Regular);
        builder
            .append_data(&mut header, path, *contents)
            .expect("append tar entry");
    }

    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}

/// A minimal Go release archive: `go/bin/go` and `go/VERSION`.
pub fn go_distribution() -> Vec<u8> {
    let go_binary = format!("go/bin/go{}", exe_extension());
    tarball(&[
        (go_binary.as_str(), b"#!/bin/sh\necho go1.23.1\n".as_slice(), 0o755),
        ("go/VERSION", b"go1.23.1\n".as_slice(), 0o644),
    ])
}

/// Shared call counter handed out by the stubs.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    /// Number of calls recorded so far.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// URLs requested from a [`StubDownloader`], in order.
#[derive(Debug, Clone, Default)]
pub struct UrlLog(Arc<Mutex<Vec<String>>>);

impl UrlLog {
    /// Snapshot of the requested URLs.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, url: &str) {
        self.0.lock().unwrap().push(url.to_string());
    }
}

/// Downloader serving fixed bytes (or a fixed failure) for every URL.
#[derive(Debug)]
pub struct StubDownloader {
    body: Result<Vec<u8>, String>,
    calls: CallCounter,
    urls: UrlLog,
}

impl StubDownloader {
    /// Serve `body` for every request.
    pub fn serving(body: Vec<u8>) -> Self {
        StubDownloader {
            body: Ok(body),
            calls: CallCounter::default(),
            urls: UrlLog::default(),
        }
    }

    /// Fail every request with `message`.
    pub fn failing(message: &str) -> Self {
        StubDownloader {
            body: Err(message.to_string()),
            calls: CallCounter::default(),
            urls: UrlLog::default(),
        }
    }

    /// Counter shared with this downloader.
    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }

    /// URL log shared with this downloader.
    pub fn url_log(&self) -> UrlLog {
        self.urls.clone()
    }
}

impl Downloader for StubDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.calls.record();
        self.urls.push(url);
        match &self.body {
            Ok(body) => {
                std::fs::write(dest, body)?;
                Ok(())
            }
            Err(message) => bail!("failed to download {}: {}", url, message),
        }
    }
}

/// Downloader that must never be called.
#[derive(Debug, Default)]
pub struct FailingDownloader;

impl Downloader for FailingDownloader {
    fn download(&self, url: &str, _dest: &Path) -> Result<()> {
        bail!("unexpected download of {}", url)
    }
}

#[derive(Debug, Clone)]
enum BuildOutcome {
    Succeed,
    FailAfterPartialWrite(String),
    BootstrapFailure,
}

/// Builder that writes a small shell script instead of compiling.
#[derive(Debug)]
pub struct StubBuilder {
    outcome: BuildOutcome,
    calls: CallCounter,
}

impl StubBuilder {
    /// A builder whose builds succeed.
    pub fn new() -> Self {
        StubBuilder {
            outcome: BuildOutcome::Succeed,
            calls: CallCounter::default(),
        }
    }

    /// A builder that writes part of the executable, then fails.
    pub fn failing_after_partial_write(message: &str) -> Self {
        StubBuilder {
            outcome: BuildOutcome::FailAfterPartialWrite(message.to_string()),
            calls: CallCounter::default(),
        }
    }

    /// A builder whose toolchain cannot be provisioned.
    pub fn bootstrap_failure() -> Self {
        StubBuilder {
            outcome: BuildOutcome::BootstrapFailure,
            calls: CallCounter::default(),
        }
    }

    /// Counter shared with this builder.
    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl Default for StubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageBuilder for StubBuilder {
    fn build(&self, request: &InstallRequest, out_dir: &Path) -> Result<PathBuf> {
        self.calls.record();

        let output = out_dir.join(format!(
            "{}{}",
            request.installed_binary_name(),
            exe_extension()
        ));

        match &self.outcome {
            BuildOutcome::Succeed => {
                let script = format!("#!/bin/sh\necho {}\n", request.package);
                std::fs::write(&output, script)?;
                crate::util::fs::set_executable(&output)?;
                Ok(output)
            }
            BuildOutcome::FailAfterPartialWrite(message) => {
                std::fs::write(&output, b"#!/bin/")?;
                bail!("{}", message)
            }
            BuildOutcome::BootstrapFailure => Err(GorunError::Bootstrap {
                version: "1.23.1".to_string(),
                message: "HTTP 503".to_string(),
            }
            .into()),
        }
    }
}
