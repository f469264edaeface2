//! icloud-album - fetch and download photos from iCloud shared albums
//!
//! This library talks to the public shared-stream endpoints behind
//! `https://www.icloud.com/sharedalbum/#TOKEN` links.
//!
//! # Features
//!
//! - Partition routing and 330 redirect handling
//! - Tolerant decoding of album metadata and photo lists
//! - Asset URL resolution and derivative enrichment
//! - Best-derivative selection and content type sniffing
//! - Retry with configurable backoff
//! - Concurrent album downloads with atomic writes
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use icloud_album::{download_photo, RetryPolicy, SharedStreamApi, DEFAULT_TIMEOUT};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = SharedStreamApi::new(DEFAULT_TIMEOUT, "icloud-album", RetryPolicy::default())?;
//!     let album = api.fetch_album("B0aGWZuqDGHG2hn").await?;
//!
//!     for (i, photo) in album.photos.iter().enumerate() {
//!         download_photo(&api, photo, Some(i), Path::new("photos"), None).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::{
    AlbumToken, Album, AssetUrlFailurePolicy, BackoffStrategy, Derivative, FetchWarning, Photo,
    RetryPolicy, SharedStreamApi, StreamMetadata, DEFAULT_TIMEOUT,
};
pub use config::Config;
pub use download::{download_album, download_photo, DownloadState};
pub use error::{Error, Result};
pub use media::{detect_mime_type, enrich_photos, select_best_derivative};
