//! Filesystem module.
//!
//! Provides:
//! - Album folder resolution and directory creation
//! - Filename composition and sanitization

pub mod naming;
pub mod paths;

pub use naming::{compose_base_name, sanitize_component, trim_dots, validate_filename};
pub use paths::{ensure_dir, get_album_folder};
