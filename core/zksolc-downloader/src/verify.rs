//! Self-check of a downloaded compiler binary.
//!
//! The binary is run as `<path> --version`. It is usable when it exits with
//! status 0 and prints a dotted `MAJOR.MINOR.PATCH` number somewhere on stdout.
//! A number that differs from the expected label is reported, not rejected.

use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::errors::{DownloaderError, Result};
use crate::resolver::Advisory;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.\d+\.\d+").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// The version the binary printed.
    pub reported: String,
    /// Set when `reported` differs from the expected version.
    pub mismatch: Option<Advisory>,
}

/// Extracts the first `\d+\.\d+\.\d+` match from `output`.
#[must_use]
pub fn extract_version(output: &str) -> Option<&str> {
    VERSION_PATTERN.find(output).map(|m| m.as_str())
}

/// Runs `binary --version` and checks the reported version against `expected`.
///
/// # Errors
///
/// - [`DownloaderError::BinaryCorrupted`] if the binary cannot be spawned, exits
///   non-zero, or prints no version
/// - [`DownloaderError::VerificationTimeout`] if `timeout` elapses first
pub async fn verify_binary(
    binary: &Path,
    expected: &str,
    timeout: Option<Duration>,
) -> Result<Verification> {
    let mut command = tokio::process::Command::new(binary);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let run = command.output();
    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
            DownloaderError::VerificationTimeout {
                path: binary.to_path_buf(),
                timeout: limit,
            }
        })?,
        None => run.await,
    }
    .map_err(|e| DownloaderError::binary_corrupted(binary.to_path_buf(), e.to_string()))?;

    if !output.status.success() {
        return Err(DownloaderError::binary_corrupted(
            binary.to_path_buf(),
            format!("`--version` exited with {}", output.status),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let Some(reported) = extract_version(&stdout) else {
        return Err(DownloaderError::binary_corrupted(
            binary.to_path_buf(),
            "`--version` printed no version number",
        ));
    };

    let mismatch = (reported != expected).then(|| Advisory::VersionMismatch {
        expected: expected.to_string(),
        reported: reported.to_string(),
    });

    Ok(Verification {
        reported: reported.to_string(),
        mismatch,
    })
}
