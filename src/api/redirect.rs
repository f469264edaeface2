//! Handling of the service's proprietary 330 redirect.
//!
//! A token computed onto the wrong partition gets status 330 with the owning
//! host in the JSON body instead of a `Location` header.

use serde_json::{json, Map, Value};
use url::Url;

use crate::api::partition::{AlbumToken, Endpoint};
use crate::api::transport::{HttpRequest, Transport};
use crate::error::Result;

/// Non-standard status signalling a partition redirect.
pub const REDIRECT_STATUS: u16 = 330;

/// Body field naming the replacement host.
const REDIRECT_HOST_FIELD: &str = "X-Apple-MMe-Host";

/// Outcome of probing a stream endpoint.
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint {
    pub endpoint: Endpoint,
    /// Body of a 2xx probe, reusable as the `webstream` response.
    pub stream_body: Option<Vec<u8>>,
}

/// Body of every `webstream` request; the change tag is always null.
pub fn stream_request_body() -> Value {
    json!({ "streamCtag": null })
}

/// Probe `endpoint` and follow a 330 redirect if one is returned.
///
/// Transport failures propagate immediately; this probe is never retried.
/// Statuses other than 330 are left for the metadata fetch to judge.
pub async fn resolve_endpoint(
    transport: &dyn Transport,
    endpoint: Endpoint,
    token: &AlbumToken,
) -> Result<ResolvedEndpoint> {
    let request = HttpRequest::post_json(endpoint.stream_url(), stream_request_body());
    let response = transport.execute(request).await?;

    if response.status == REDIRECT_STATUS {
        let body: Map<String, Value> = response.json()?;
        let host = body
            .get(REDIRECT_HOST_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default();

        if host.is_empty() {
            tracing::debug!("Redirect without host; keeping {}", endpoint);
        } else if is_plain_host(host) {
            let redirected = Endpoint::with_host(host, token);
            tracing::debug!("Redirected to {}", redirected);
            return Ok(ResolvedEndpoint {
                endpoint: redirected,
                stream_body: None,
            });
        } else {
            tracing::warn!("Ignoring malformed redirect host {:?}", host);
        }

        return Ok(ResolvedEndpoint {
            endpoint,
            stream_body: None,
        });
    }

    let stream_body = response.is_success().then_some(response.body);
    Ok(ResolvedEndpoint {
        endpoint,
        stream_body,
    })
}

/// True when `authority` is `host` or `host:port`, with no path, query,
/// fragment or credentials.
fn is_plain_host(authority: &str) -> bool {
    let Ok(url) = Url::parse(&format!("https://{}/", authority)) else {
        return false;
    };

    let (name, port) = match authority.rsplit_once(':') {
        Some((name, port)) => (name, Some(port)),
        None => (authority, None),
    };

    url.host_str()
        .is_some_and(|parsed| parsed.eq_ignore_ascii_case(name))
        && port.map_or(true, |p| p.parse::<u16>().is_ok())
        && url.username().is_empty()
        && url.password().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
}
