//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::AssetUrlFailurePolicy;
use crate::config::Config;

/// iCloud shared album CLI.
#[derive(Parser, Debug)]
#[command(
    name = "icloud-album",
    version,
    about = "Fetch and download photos from iCloud shared albums",
    long_about = "A CLI tool to inspect and download the photos of a public iCloud shared album.\n\n\
                  ALBUM is either the album token or the full share link, e.g.\n\
                  https://www.icloud.com/sharedalbum/#B0aGWZuqDGHG2hn"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "ICLOUD_ALBUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Maximum retries per request.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Fail instead of continuing when download URLs cannot be fetched.
    #[arg(long, global = true)]
    pub strict: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show album name, owner and the first few photos.
    Info {
        /// Album token or share link.
        album: String,
    },
    /// List every photo with all derivatives and their URLs.
    Fetch {
        /// Album token or share link.
        album: String,
    },
    /// Download the best rendition of every photo.
    Download {
        /// Album token or share link.
        album: String,

        /// Base directory for downloads.
        #[arg(short = 'd', long = "directory")]
        download_directory: Option<PathBuf>,

        /// Number of photos downloaded at once.
        #[arg(short = 'j', long = "jobs")]
        jobs: Option<usize>,

        /// Save directly into the directory instead of an album subfolder.
        #[arg(long)]
        no_subfolder: bool,
    },
}

impl Command {
    /// The album argument of any subcommand.
    pub fn album(&self) -> &str {
        match self {
            Command::Info { album } | Command::Fetch { album } | Command::Download { album, .. } => {
                album
            }
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(timeout) = self.timeout {
            config.client.timeout_secs = timeout;
        }

        if let Some(retries) = self.max_retries {
            config.retry.max_retries = retries;
        }

        // Boolean flags (only override if set to non-default)
        if self.strict {
            config.options.asset_url_failure = AssetUrlFailurePolicy::Abort;
        }

        if let Command::Download {
            download_directory,
            jobs,
            no_subfolder,
            ..
        } = &self.command
        {
            if let Some(dir) = download_directory {
                config.options.download_directory = Some(dir.clone());
            }

            if let Some(jobs) = jobs {
                config.options.concurrent_downloads = *jobs;
            }

            if *no_subfolder {
                config.options.album_subfolder = false;
            }
        }
    }
}
