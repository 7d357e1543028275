use std::path::{Path, PathBuf};
use crate::error::{MaltError, Result};
use crate::formula::Source;
use crate::global::cache::{cache_archive, get_cached_archive};
use crate::util::{format_digest, sha256_hex};
use colored::Colorize;

/// A source archive that has been acquired and digested.
#[derive(Debug)]
pub struct Acquired {
    /// Path of the archive on disk (cache entry or local source).
    pub archive: PathBuf,
    /// Actual SHA-256 of the archive contents.
    pub sha256: String,
}

/// Acquires the formula's source archive and verifies its digest.
///
/// Https URLs are downloaded (through the global archive cache); anything
/// else is treated as a local path. When the formula declares a digest it
/// must match before the archive is trusted; an empty digest skips
/// verification with a warning.
pub fn acquire(source: &Source) -> Result<Acquired> {
    let url = &source.url;
    let (archive, bytes) = if is_remote(url) {
        match get_cached_archive(url)? {
            Some(path) => {
                let bytes = std::fs::read(&path)?;
                (path, bytes)
            }
            None => {
                let bytes = download(url)?;
                let path = cache_archive(url, &bytes)?;
                (path, bytes)
            }
        }
    } else {
        let path = PathBuf::from(url);
        if !path.is_file() {
            return Err(MaltError::Fetch {
                url: url.clone(),
                message: String::from("source archive not found"),
            });
        }
        let bytes = std::fs::read(&path)?;
        (path, bytes)
    };

    let actual = sha256_hex(&bytes);
    let expected = format_digest(source.sha256.trim());
    if expected.is_empty() {
        println!(
            "{} formula declares no sha256, installing unverified archive",
            "warning:".yellow().bold()
        );
    } else if !expected.eq_ignore_ascii_case(&actual) {
        return Err(MaltError::ChecksumMismatch {
            archive: archive.display().to_string(),
            expected,
            actual,
        });
    }

    Ok(Acquired {
        archive,
        sha256: actual,
    })
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn download(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        return Err(MaltError::Fetch {
            url: url.to_string(),
            message: format!("server returned {}", response.status()),
        });
    }
    Ok(response.bytes()?.to_vec())
}

/// Extracts an archive into `dest` and returns the source root.
///
/// GitHub release tarballs wrap everything in a single `<name>-<tag>`
/// directory; that directory is returned as the root in that case.
pub fn extract(archive: &Path, dest: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dest)?;
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        let file = std::fs::File::open(archive)?;
        let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
        tar.unpack(dest)?;
    } else if name.ends_with(".zip") {
        let file = std::fs::File::open(archive)?;
        let mut zip = zip::ZipArchive::new(file).map_err(|e| MaltError::Fetch {
            url: archive.display().to_string(),
            message: e.to_string(),
        })?;
        zip.extract(dest).map_err(|e| MaltError::Fetch {
            url: archive.display().to_string(),
            message: e.to_string(),
        })?;
    } else {
        return Err(MaltError::Fetch {
            url: archive.display().to_string(),
            message: String::from("unsupported archive format (expected .tar.gz, .tgz or .zip)"),
        });
    }

    source_root(dest)
}

fn source_root(dest: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dest)?.collect::<std::io::Result<Vec<_>>>()?;
    if entries.len() == 1 && entries[0].file_type()?.is_dir() {
        Ok(entries[0].path())
    } else {
        Ok(dest.to_path_buf())
    }
}
