use std::path::{Path, PathBuf};
use crate::error::{MaltError, Result};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use semver::Version;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

#[cfg(windows)]
pub const EXEC_EXT: &str = "exe";
#[cfg(not(windows))]
pub const EXEC_EXT: &str = "";

/// Ensures the install prefix layout exists.
/// Creates `<prefix>/bin` and `<prefix>/receipts` if they don't already exist.
///
/// Returns the full path to the prefix directory.
pub fn ensure_prefix_dirs<P: AsRef<Path>>(prefix: P) -> Result<PathBuf> {
    let path = PathBuf::from(prefix.as_ref());
    std::fs::create_dir_all(&path)?;
    let bin_path = path.join("bin");
    std::fs::create_dir_all(&bin_path)?;
    let receipts_path = path.join("receipts");
    std::fs::create_dir_all(&receipts_path)?;
    Ok(path)
}

/// Returns the default install prefix: `.malt` in the current working directory.
pub fn default_prefix() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(".malt"))
}

/// Returns the path of the install receipt for a tool under the given prefix.
pub fn receipt_path(prefix: &Path, name: &str) -> PathBuf {
    prefix.join("receipts").join(format!("{name}.json"))
}

/// Strips the `sha256:` prefix from a digest if present.
/// This is useful for formatting digests uniformly.
pub fn format_digest(digest: &str) -> String {
    if let Some(digest) = digest.strip_prefix("sha256:") {
        digest.to_string()
    } else {
        digest.to_string()
    }
}

/// Hex-encoded SHA-256 of the given bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Validates whether a version string is a valid SemVer version.
/// Ignores build metadata and target suffixes.
pub fn is_valid_version(version: &str) -> bool {
    let version = version.split('-').next().unwrap_or(version);
    Version::parse(version).is_ok()
}

/// Current UTC time in ISO-8601 with second precision, e.g. `2024-01-01T00:00:00Z`.
pub fn iso8601_utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Short commit hash of the working directory's git checkout, if any.
pub fn git_short_head() -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let head = String::from_utf8(output.stdout).ok()?;
    let head = head.trim();
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

/// The platform file name of a binary, e.g. `hsctl` or `hsctl.exe`.
pub fn binary_file_name(name: &str) -> String {
    if EXEC_EXT.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{EXEC_EXT}")
    }
}

/// Searches `<prefix>/bin` for the installed binary of a tool.
/// Picks the first executable whose file name matches the tool name.
pub fn locate_binary(prefix: &Path, name: &str) -> Result<Option<PathBuf>> {
    let bin_dir = prefix.join("bin");
    if !bin_dir.exists() {
        return Ok(None);
    }
    let mut candidates = Vec::new();
    for entry in WalkDir::new(&bin_dir).max_depth(1) {
        let entry = entry.map_err(|e| MaltError::Internal(e.to_string()))?;
        let path = entry.path();
        if entry.file_type().is_file() && is_executable(path) {
            candidates.push(path.to_path_buf());
        }
    }
    if candidates.is_empty() {
        return Ok(None);
    }

    let re = Regex::new(&format!(r"(?i)^{}", regex::escape(name)))
        .map_err(|e| MaltError::Internal(e.to_string()))?;
    let matching = candidates.into_iter().find(|p| {
        let fname = p
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_lowercase();
        re.is_match(&fname)
    });
    Ok(matching)
}

/// Checks if a given path is an executable file on Unix.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Checks if a given path has a Windows executable extension (.exe, .bat, .cmd).
#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_ascii_lowercase();
        matches!(ext.as_str(), "exe" | "bat" | "cmd")
    } else {
        false
    }
}
