//! Error types for the icloud-album crate.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Token errors
    #[error("Invalid album token: {0}")]
    InvalidToken(String),

    // API errors
    #[error("Network error: {0}")]
    Transport(String),

    #[error("{context} failed: HTTP {code}")]
    Status { code: u16, context: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    // Download errors
    #[error("No downloadable derivative for photo {0}")]
    NoDerivative(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Build a status error for a request described by `context`.
    pub fn status(code: u16, context: impl Into<String>) -> Self {
        Error::Status {
            code,
            context: context.into(),
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_invalid_token(&self) -> bool {
        matches!(self, Error::InvalidToken(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes used by the CLI.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USAGE_ERROR: i32 = 2;
    pub const API_ERROR: i32 = 3;
    pub const CONFIG_ERROR: i32 = 4;
    pub const DOWNLOAD_ERROR: i32 = 5;
    pub const UNEXPECTED_ERROR: i32 = 6;
}
