//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::fs::naming::sanitize_component;

/// Folder used when an album name sanitizes to nothing.
const FALLBACK_ALBUM_FOLDER: &str = "shared_album";

/// Get the output directory for an album.
///
/// With `album_subfolder` enabled the sanitized album name is appended to the
/// download directory.
pub fn get_album_folder(config: &Config, album_name: &str) -> PathBuf {
    let base_dir = config.download_directory();

    if !config.options.album_subfolder {
        return base_dir;
    }

    let folder = sanitize_component(album_name);
    if folder.is_empty() {
        base_dir.join(FALLBACK_ALBUM_FOLDER)
    } else {
        base_dir.join(folder)
    }
}

/// Ensure a directory exists, creating it if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !tokio::fs::try_exists(path).await? {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}
