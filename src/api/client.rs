//! Shared-stream API client.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::partition::{AlbumToken, Endpoint};
use crate::api::redirect::{resolve_endpoint, stream_request_body};
use crate::api::retry::{execute_with_retry, execute_with_retry_accepting, RetryPolicy};
use crate::api::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::api::types::*;
use crate::error::{Error, Result};
use crate::media::enrich_photos;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `webasseturls` status meaning "no URLs for this request", not a failure.
const DEGRADED_STATUS: u16 = 400;

/// What `fetch_album` does when the asset-URL lookup fails after retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetUrlFailurePolicy {
    /// Continue without URLs and attach a warning to the album.
    #[default]
    Warn,
    /// Fail the whole fetch.
    Abort,
}

/// Result of an asset-URL lookup.
#[derive(Debug, Clone, Default)]
pub struct AssetUrls {
    pub urls: AssetUrlMap,
    /// The server answered 400; `urls` is empty but this is not an error.
    pub degraded: bool,
}

/// Client for the iCloud shared-stream web API.
#[derive(Clone)]
pub struct SharedStreamApi {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    asset_url_failure: AssetUrlFailurePolicy,
}

impl SharedStreamApi {
    /// Create a client with a `reqwest` transport.
    pub fn new(timeout: Duration, user_agent: &str, retry: RetryPolicy) -> Result<Self> {
        let transport = ReqwestTransport::new(timeout, user_agent)?;
        Ok(Self::with_transport(Arc::new(transport), retry))
    }

    /// Create a client over any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            retry,
            asset_url_failure: AssetUrlFailurePolicy::default(),
        }
    }

    pub fn with_asset_url_failure(mut self, policy: AssetUrlFailurePolicy) -> Self {
        self.asset_url_failure = policy;
        self
    }

    /// Fetch album metadata and photos with resolved asset URLs.
    pub async fn fetch_album(&self, token: &str) -> Result<Album> {
        let token = AlbumToken::parse(token)?;
        let resolved =
            resolve_endpoint(self.transport.as_ref(), Endpoint::for_token(&token), &token).await?;
        let endpoint = resolved.endpoint;

        let (metadata, mut photos) = match resolved.stream_body {
            Some(body) => StreamResponse::from_slice(&body)?.into_parts()?,
            None => self.get_stream(&endpoint).await?,
        };
        tracing::info!(
            "Album '{}' lists {} photos",
            metadata.stream_name,
            photos.len()
        );

        let guids: Vec<String> = photos.iter().map(|p| p.photo_guid.clone()).collect();
        let mut warnings = Vec::new();

        let urls = match self.get_asset_urls(&endpoint, &guids).await {
            Ok(lookup) => {
                if lookup.degraded {
                    warnings.push(FetchWarning::AssetUrlsDegraded);
                }
                lookup.urls
            }
            Err(e) => match self.asset_url_failure {
                AssetUrlFailurePolicy::Abort => return Err(e),
                AssetUrlFailurePolicy::Warn => {
                    tracing::warn!("Continuing without asset URLs: {}", e);
                    warnings.push(FetchWarning::AssetUrlsUnavailable(e.to_string()));
                    AssetUrlMap::default()
                }
            },
        };

        enrich_photos(&mut photos, &urls);

        Ok(Album {
            metadata,
            photos,
            warnings,
        })
    }

    /// Fetch album metadata and the ordered photo list.
    pub async fn get_stream(&self, endpoint: &Endpoint) -> Result<(StreamMetadata, Vec<Photo>)> {
        let url = endpoint.stream_url();
        let response = execute_with_retry(&self.retry, "webstream request", || {
            self.transport
                .execute(HttpRequest::post_json(url.clone(), stream_request_body()))
        })
        .await?;

        tracing::debug!("Stream response: {} bytes", response.body.len());
        StreamResponse::from_slice(&response.body)?.into_parts()
    }

    /// Look up download URLs for the given photo guids.
    ///
    /// An empty list returns immediately. HTTP 400 is a degraded success.
    pub async fn get_asset_urls(&self, endpoint: &Endpoint, guids: &[String]) -> Result<AssetUrls> {
        if guids.is_empty() {
            tracing::debug!("No photo guids; skipping asset URL lookup");
            return Ok(AssetUrls::default());
        }

        let url = endpoint.asset_urls_url();
        let body = json!({ "photoGuids": guids });
        let response = execute_with_retry_accepting(
            &self.retry,
            "webasseturls request",
            &[DEGRADED_STATUS],
            || {
                self.transport
                    .execute(HttpRequest::post_json(url.clone(), body.clone()))
            },
        )
        .await?;

        if response.status == DEGRADED_STATUS {
            tracing::warn!("webasseturls returned 400; continuing without URLs");
            return Ok(AssetUrls {
                urls: AssetUrlMap::default(),
                degraded: true,
            });
        }

        let parsed: AssetUrlsResponse = response.json()?;
        let urls = parsed.into_url_map();
        tracing::debug!("Resolved {} asset URLs for {} photos", urls.len(), guids.len());

        Ok(AssetUrls {
            urls,
            degraded: false,
        })
    }

    /// Download a file through the retry policy.
    pub async fn download_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = execute_with_retry(&self.retry, "asset download", || {
            self.transport.execute(HttpRequest::get(url))
        })
        .await?;

        Ok(response.body)
    }
}

impl std::fmt::Debug for SharedStreamApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStreamApi")
            .field("retry", &self.retry)
            .field("asset_url_failure", &self.asset_url_failure)
            .finish_non_exhaustive()
    }
}

/// Convert a token error into a readable hint for users pasting URLs.
pub fn describe_token_error(err: &Error) -> Option<&'static str> {
    err.is_invalid_token()
        .then_some("Pass the part after '#' in the shared album link")
}
