//! Download module for saving album photos.
//!
//! This module provides:
//! - Single photo downloading with atomic writes
//! - Album downloading with bounded concurrency
//! - Download statistics

pub mod album;
pub mod photo;
pub mod state;

pub use album::download_album;
pub use photo::download_photo;
pub use state::{DownloadState, FailedDownload};
