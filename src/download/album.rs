//! Whole-album downloading.

use std::path::Path;

use futures::stream::{self, StreamExt};

use crate::api::types::Album;
use crate::api::SharedStreamApi;
use crate::download::photo::download_photo;
use crate::download::state::DownloadState;
use crate::error::Result;
use crate::fs::ensure_dir;
use crate::output::create_item_bar;

/// Download every photo of `album` into `output_dir`.
///
/// Up to `concurrency` photos are fetched at once. A photo that fails is
/// logged and recorded in the returned state; it does not stop the others.
pub async fn download_album(
    api: &SharedStreamApi,
    album: &Album,
    output_dir: &Path,
    concurrency: usize,
    show_progress: bool,
) -> Result<DownloadState> {
    let total = album.photos.len() as u64;
    let mut state = DownloadState::new(
        album.metadata.stream_name.clone(),
        output_dir.to_path_buf(),
        total,
    );

    if album.photos.is_empty() {
        tracing::info!("Album '{}' has no photos", album.metadata.stream_name);
        return Ok(state);
    }

    ensure_dir(output_dir).await?;
    tracing::info!(
        "Downloading {} photos to {} ({} at a time)",
        total,
        output_dir.display(),
        concurrency.max(1)
    );

    let progress = show_progress.then(|| create_item_bar(total, "Downloading"));

    let mut downloads = stream::iter(album.photos.iter().enumerate())
        .map(|(index, photo)| async move {
            let result = download_photo(api, photo, Some(index), output_dir, None).await;
            (photo, result)
        })
        .buffer_unordered(concurrency.max(1));

    while let Some((photo, result)) = downloads.next().await {
        match result {
            Ok(path) => {
                let bytes = tokio::fs::metadata(&path)
                    .await
                    .map(|m| m.len())
                    .unwrap_or_default();
                tracing::debug!("Downloaded: {}", path.display());
                state.record_saved(&path, bytes);
            }
            Err(e) => {
                tracing::warn!("Failed to download photo {}: {}", photo.photo_guid, e);
                state.record_failure(photo.photo_guid.clone(), e.to_string());
            }
        }

        if let Some(ref bar) = progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    tracing::info!(
        "Album download complete: {} pictures, {} videos, {} failed",
        state.pic_count,
        state.vid_count,
        state.failed_count()
    );

    Ok(state)
}
