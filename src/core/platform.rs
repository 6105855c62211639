//! Host platform identity, in the vocabulary Go release archives use.

/// Operating system and architecture of a Go distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoPlatform {
    /// GOOS value (linux, darwin, windows, ...)
    pub os: String,
    /// GOARCH value (amd64, arm64, 386, ...)
    pub arch: String,
}

impl GoPlatform {
    /// Create a platform from GOOS/GOARCH names.
    pub fn new(os: &str, arch: &str) -> Self {
        GoPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        }
    }

    /// Detect the host platform.
    pub fn host() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Translate Rust's `std::env::consts` names into Go's.
    pub fn from_rust(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };

        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "arm" => "armv6l",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };

        GoPlatform::new(os, arch)
    }

    /// Whether this is a Windows platform.
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Archive format Go publishes for this platform.
    pub fn archive_format(&self) -> ArchiveFormat {
        if self.is_windows() {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }

    /// File name of the release archive for a Go version.
    pub fn archive_name(&self, version: &str) -> String {
        format!(
            "go{}.{}-{}.{}",
            version,
            self.os,
            self.arch,
            self.archive_format().extension()
        )
    }
}

impl std::fmt::Display for GoPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Release archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }
}

/// Executable file extension of the host platform.
pub fn exe_extension() -> &'static str {
    std::env::consts::EXE_SUFFIX
}
