//! Error types for gorun operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a gorun invocation.
///
/// A launched program exiting non-zero is not one of these: its exit code
/// is propagated as gorun's own.
#[derive(Debug, Error)]
pub enum GorunError {
    #[error("failed to provision Go {version}: {message}")]
    Bootstrap { version: String, message: String },

    #[error("failed to build `{package}@{version}`: {message}")]
    Build {
        package: String,
        version: String,
        message: String,
    },

    #[error("failed to run `{}`", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package `{0}`: expected <package>@<version>")]
    InvalidPackageSpec(String),
}

impl GorunError {
    /// Create a build error from an underlying failure.
    pub fn build(package: &str, version: &str, err: &anyhow::Error) -> Self {
        GorunError::Build {
            package: package.to_string(),
            version: version.to_string(),
            message: format!("{:#}", err),
        }
    }
}
