//! Download state tracking.

use std::path::{Path, PathBuf};

/// A photo that could not be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub photo_guid: String,
    pub reason: String,
}

/// Per-album download state.
#[derive(Debug, Default)]
pub struct DownloadState {
    pub album_name: String,
    pub output_dir: PathBuf,

    // Statistics
    pub total_photos: u64,
    pub pic_count: u64,
    pub vid_count: u64,
    pub bytes_written: u64,
    pub failures: Vec<FailedDownload>,
}

impl DownloadState {
    /// Create a new download state for an album.
    pub fn new(album_name: impl Into<String>, output_dir: PathBuf, total_photos: u64) -> Self {
        Self {
            album_name: album_name.into(),
            output_dir,
            total_photos,
            ..Default::default()
        }
    }

    /// Record a saved file, counted as a video or a picture by its extension.
    pub fn record_saved(&mut self, path: &Path, bytes: u64) {
        if is_video_path(path) {
            self.vid_count += 1;
        } else {
            self.pic_count += 1;
        }
        self.bytes_written += bytes;
    }

    /// Record a photo that failed to download.
    pub fn record_failure(&mut self, photo_guid: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(FailedDownload {
            photo_guid: photo_guid.into(),
            reason: reason.into(),
        });
    }

    /// Get total downloaded count.
    pub fn total_downloaded(&self) -> u64 {
        self.pic_count + self.vid_count
    }

    pub fn failed_count(&self) -> u64 {
        self.failures.len() as u64
    }

    /// Whether every photo was saved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.total_downloaded() == self.total_photos
    }
}

fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "mov" | "mp4"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_saved_counts_by_kind() {
        let mut state = DownloadState::new("Trip", PathBuf::from("/out"), 3);
        state.record_saved(Path::new("/out/1_A.jpg"), 100);
        state.record_saved(Path::new("/out/2_B.MOV"), 2000);
        state.record_saved(Path::new("/out/3_C.heic"), 50);

        assert_eq!(state.pic_count, 2);
        assert_eq!(state.vid_count, 1);
        assert_eq!(state.bytes_written, 2150);
        assert_eq!(state.total_downloaded(), 3);
        assert!(state.is_complete());
    }

    #[test]
    fn test_failures_make_state_incomplete() {
        let mut state = DownloadState::new("Trip", PathBuf::from("/out"), 2);
        state.record_saved(Path::new("/out/1_A.jpg"), 10);
        state.record_failure("B", "HTTP 404");

        assert_eq!(state.failed_count(), 1);
        assert_eq!(state.failures[0].photo_guid, "B");
        assert!(!state.is_complete());
    }
}
