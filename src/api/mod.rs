//! iCloud shared-stream API module.
//!
//! This module provides:
//! - Token validation and partition routing
//! - The 330 redirect probe
//! - A retrying HTTP executor over a pluggable transport
//! - Schema-tolerant response types

pub mod client;
pub mod lenient;
pub mod partition;
pub mod redirect;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{AssetUrlFailurePolicy, AssetUrls, SharedStreamApi, DEFAULT_TIMEOUT};
pub use partition::{AlbumToken, Endpoint};
pub use retry::{execute_with_retry, execute_with_retry_accepting, BackoffStrategy, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::*;
