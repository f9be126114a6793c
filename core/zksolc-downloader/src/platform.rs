//! Platform detection for zksolc binaries.
//!
//! ## Supported Platforms
//!
//! - Linux `x86_64` (`linux-amd64`, musl build)
//! - Linux ARM64 (`linux-arm64`, musl build)
//! - macOS `x86_64` (`macosx-amd64`)
//! - macOS ARM64 (`macosx-arm64`)
//! - Windows `x86_64` (`windows-amd64`, gnu build)

use std::fmt;

use crate::errors::{DownloaderError, Result};

/// A platform with a published zksolc binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux on `x86_64`
    LinuxAmd64,
    /// Linux on ARM64
    LinuxArm64,
    /// macOS on `x86_64`
    MacosAmd64,
    /// macOS on ARM64 (Apple Silicon)
    MacosArm64,
    /// Windows on `x86_64`
    WindowsAmd64,
}

impl Platform {
    /// Detects the current platform based on compile-time configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DownloaderError::UnsupportedPlatform`] if no binary is published
    /// for the current OS/architecture combination.
    pub fn detect() -> Result<Self> {
        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        {
            return Ok(Self::LinuxAmd64);
        }

        #[cfg(all(target_os = "linux", target_arch = "aarch64"))]
        {
            return Ok(Self::LinuxArm64);
        }

        #[cfg(all(target_os = "macos", target_arch = "x86_64"))]
        {
            return Ok(Self::MacosAmd64);
        }

        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        {
            return Ok(Self::MacosArm64);
        }

        #[cfg(all(target_os = "windows", target_arch = "x86_64"))]
        {
            return Ok(Self::WindowsAmd64);
        }

        #[allow(unreachable_code)]
        {
            return Err(DownloaderError::UnsupportedPlatform {
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
            });
        }
    }

    /// Returns the directory name used by the binary repository.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinuxAmd64 => "linux-amd64",
            Self::LinuxArm64 => "linux-arm64",
            Self::MacosAmd64 => "macosx-amd64",
            Self::MacosArm64 => "macosx-arm64",
            Self::WindowsAmd64 => "windows-amd64",
        }
    }

    /// Returns the artifact name prefix published for this platform.
    ///
    /// The canonical URL is `<root>/<artifact_name>-v<version><ext>`.
    #[must_use]
    pub fn artifact_name(self) -> &'static str {
        match self {
            Self::LinuxAmd64 => "linux-amd64/zksolc-linux-amd64-musl",
            Self::LinuxArm64 => "linux-arm64/zksolc-linux-arm64-musl",
            Self::MacosAmd64 => "macosx-amd64/zksolc-macosx-amd64",
            Self::MacosArm64 => "macosx-arm64/zksolc-macosx-arm64",
            Self::WindowsAmd64 => "windows-amd64/zksolc-windows-amd64-gnu",
        }
    }

    /// Returns `.exe` on Windows, empty string elsewhere.
    #[must_use]
    pub fn executable_extension(self) -> &'static str {
        match self {
            Self::WindowsAmd64 => ".exe",
            Self::LinuxAmd64 | Self::LinuxArm64 | Self::MacosAmd64 | Self::MacosArm64 => "",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
