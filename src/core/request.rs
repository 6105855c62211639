//! Install requests: what to build and how.

use std::str::FromStr;

use crate::core::cache_key::CacheKey;
use crate::core::error::GorunError;

/// A `<package>@<version>` pair as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Import path of the main package (e.g., golang.org/x/tools/cmd/stringer)
    pub path: String,
    /// Version, taken verbatim (tag, pseudo-version, branch, "latest", ...)
    pub version: String,
}

impl FromStr for PackageSpec {
    type Err = GorunError;

    /// Split on the first `@`. Versions may themselves contain `@`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((path, version)) if !path.is_empty() && !version.is_empty() => Ok(PackageSpec {
                path: path.to_string(),
                version: version.to_string(),
            }),
            _ => Err(GorunError::InvalidPackageSpec(s.to_string())),
        }
    }
}

impl std::fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.path, self.version)
    }
}

/// Everything one invocation needs to resolve an executable.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Package to install
    pub package: PackageSpec,
    /// Comma-separated build tags, verbatim (empty = none)
    pub tags: String,
    /// Emit diagnostic logging
    pub verbose: bool,
}

impl InstallRequest {
    /// Create a request with no tags.
    pub fn new(package: PackageSpec) -> Self {
        InstallRequest {
            package,
            tags: String::new(),
            verbose: false,
        }
    }

    /// Set the build tags.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether build tags were given.
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }

    /// The cache key for this request.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::derive(&self.package.path, &self.package.version, &self.tags)
    }

    /// Name of the executable `go install` writes for this package.
    ///
    /// This is the last path element, skipping a trailing major-version
    /// element: `example.com/tool/v2` installs `tool`.
    pub fn installed_binary_name(&self) -> &str {
        let mut segments = self
            .package
            .path
            .trim_end_matches('/')
            .rsplit('/');
        let last = segments.next().unwrap_or_default();

        if is_major_version_suffix(last) {
            if let Some(prev) = segments.next() {
                return prev;
            }
        }
        last
    }
}

/// `v2`, `v3`, ... (but not `v0`, `v1` or `v01`).
fn is_major_version_suffix(segment: &str) -> bool {
    let Some(digits) = segment.strip_prefix('v') else {
        return false;
    };
    !digits.is_empty()
        && !digits.starts_with('0')
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits != "1"
}
