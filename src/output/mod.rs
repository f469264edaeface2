//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output and album listings
//! - Progress bars
//! - Statistics reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use self::console::{
    print_album_details, print_album_summary, print_album_warnings, print_error, print_info,
    print_success, print_warning,
};
pub use progress::{create_item_bar, create_spinner};
pub use stats::{format_bytes, print_download_stats};
