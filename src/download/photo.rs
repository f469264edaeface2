//! Single photo downloading.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;
use uuid::Uuid;

use crate::api::types::Photo;
use crate::api::SharedStreamApi;
use crate::error::{Error, Result};
use crate::fs::{compose_base_name, ensure_dir};
use crate::media::{extension_for_content, select_best_derivative};

/// Download the best derivative of `photo` into `output_dir`.
///
/// The file is named `{index+1}_{guid}_{label}{ext}` (see
/// [`compose_base_name`]) with the extension taken from the downloaded bytes.
/// An existing file with the same name is replaced.
pub async fn download_photo(
    api: &SharedStreamApi,
    photo: &Photo,
    index: Option<usize>,
    output_dir: &Path,
    custom_filename: Option<&str>,
) -> Result<PathBuf> {
    let selected = select_best_derivative(&photo.derivatives)
        .ok_or_else(|| Error::NoDerivative(photo.photo_guid.clone()))?;
    let base_name = compose_base_name(photo, index, custom_filename)?;

    tracing::debug!(
        "Downloading {} (derivative '{}')",
        photo.photo_guid,
        selected.key
    );
    let content = api.download_bytes(selected.url).await?;

    let extension = extension_for_content(&content, url_file_name(selected.url).as_deref());
    let output_path = output_dir.join(format!("{}{}", base_name, extension));

    ensure_dir(output_dir).await?;
    write_atomic(&output_path, &content).await?;

    tracing::debug!(
        "Saved {} ({} bytes)",
        output_path.display(),
        content.len()
    );
    Ok(output_path)
}

/// Last path segment of a download URL, used as an extension hint.
fn url_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Write to a uniquely named `.part` file beside `path`, then rename it.
async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidFilename(path.display().to_string()))?;
    let temp_path = path.with_file_name(format!(".{}.{}.part", file_name, Uuid::new_v4()));

    let written = async {
        let mut file = File::create(&temp_path).await?;
        file.write_all(content).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
            tracing::debug!("Could not remove {}: {}", temp_path.display(), cleanup);
        }
        return Err(Error::Io(e));
    }

    Ok(())
}
