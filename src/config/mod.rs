//! Configuration module for icloud-album.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation
//! - Album token parsing from share links

pub mod loader;
pub mod validation;

pub use loader::{ClientConfig, Config, OptionsConfig, RetryConfig, CONFIG_FILE_NAME};
pub use validation::{parse_album_token, validate_config};
