use std::path::PathBuf;
use crate::error::{MaltError, Result};
use crate::global::utils::get_global_cache_dir;
use walkdir::WalkDir;

/// Returns the cached copy of an archive, if one exists for this URL.
pub fn get_cached_archive(url: &str) -> Result<Option<PathBuf>> {
    let cache_dir = get_global_cache_dir()?;
    let file_name = archive_file_name(url)?;
    let archive_path = cache_dir.join(file_name);
    if archive_path.exists() {
        Ok(Some(archive_path))
    } else {
        Ok(None)
    }
}

/// Stores downloaded archive bytes in the global cache and returns the
/// cached path.
pub fn cache_archive(url: &str, bytes: &[u8]) -> Result<PathBuf> {
    let cache_dir = get_global_cache_dir()?;
    if !cache_dir.exists() {
        std::fs::create_dir_all(&cache_dir)?;
    }
    let file_name = archive_file_name(url)?;
    let path = cache_dir.join(file_name);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

pub fn clean_cache() -> Result<()> {
    let cache_dir = get_global_cache_dir()?;
    if cache_dir.exists() {
        std::fs::remove_dir_all(&cache_dir)?;
    }
    std::fs::create_dir_all(&cache_dir)?;
    Ok(())
}

pub fn is_cached(file_name: &str) -> Result<bool> {
    let cache_dir = get_global_cache_dir()?;
    if !cache_dir.exists() {
        return Ok(false);
    }
    let dir = WalkDir::new(&cache_dir);
    for entry in dir {
        let entry = entry.map_err(|e| MaltError::Internal(e.to_string()))?;
        let path = entry.path();
        if path.to_string_lossy().contains(file_name) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn archive_file_name(url: &str) -> Result<&str> {
    url.split('/').next_back().ok_or_else(|| MaltError::Fetch {
        url: url.to_string(),
        message: String::from("could not determine archive name"),
    })
}
