//! Shared-stream response types.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::lenient;
use crate::error::{Error, Result};

/// Raw `webstream` response.
///
/// Every field is optional at this level; [`StreamResponse::into_parts`]
/// enforces the one mandatory field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamResponse {
    #[serde(default, deserialize_with = "lenient::skip_invalid")]
    pub photos: Vec<Photo>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stream_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub user_first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub user_last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stream_ctag: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub items_returned: Option<u32>,
    #[serde(default)]
    pub locations: Option<Value>,
}

impl StreamResponse {
    /// Decode a response body.
    ///
    /// The body must be JSON; a JSON value of the wrong shape decodes as an
    /// empty response and is then rejected for its missing album name.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::deserialize(value).unwrap_or_else(|e| {
            tracing::warn!("Error deserializing stream response: {}", e);
            Self::default()
        }))
    }

    /// Split into metadata and photos, applying field defaults.
    pub fn into_parts(self) -> Result<(StreamMetadata, Vec<Photo>)> {
        let stream_name = self
            .stream_name
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingField("streamName"))?;

        let metadata = StreamMetadata {
            stream_name,
            user_first_name: self.user_first_name.unwrap_or_default(),
            user_last_name: self.user_last_name.unwrap_or_default(),
            stream_ctag: self.stream_ctag.unwrap_or_default(),
            items_returned: self.items_returned.unwrap_or(0),
            locations: self.locations.unwrap_or(Value::Null),
        };

        Ok((metadata, self.photos))
    }
}

/// Album metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMetadata {
    pub stream_name: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub stream_ctag: String,
    pub items_returned: u32,
    /// Passed through untouched.
    pub locations: Value,
}

impl StreamMetadata {
    /// Owner's display name.
    pub fn owner(&self) -> String {
        format!("{} {}", self.user_first_name, self.user_last_name)
            .trim()
            .to_string()
    }
}

/// A photo in a shared stream.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub photo_guid: String,
    /// Renditions keyed by derivative name, iterated in key order.
    #[serde(default, deserialize_with = "lenient::skip_invalid_map")]
    pub derivatives: BTreeMap<String, Derivative>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date_created: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub batch_date_created: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub height: Option<u32>,
}

impl Photo {
    /// Parsed `dateCreated`, if present and RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.date_created
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Caption with surrounding whitespace removed, if non-empty.
    pub fn caption_text(&self) -> Option<&str> {
        self.caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// One rendition of a photo.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derivative {
    /// Not unique across derivatives or photos.
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub checksum: String,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub file_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub height: Option<u32>,
    /// Filled in by enrichment.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub url: Option<String>,
}

impl Derivative {
    /// Pixel area when both dimensions are known.
    pub fn pixel_area(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(u64::from(w) * u64::from(h)),
            _ => None,
        }
    }
}

/// Raw `webasseturls` response.
#[derive(Debug, Default, Deserialize)]
pub struct AssetUrlsResponse {
    #[serde(default, deserialize_with = "lenient::skip_invalid_map")]
    pub items: BTreeMap<String, AssetItem>,
}

/// Location fragments for one asset.
#[derive(Debug, Default, Deserialize)]
pub struct AssetItem {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub url_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub url_path: Option<String>,
}

impl AssetUrlsResponse {
    /// Build the id → URL map, skipping items missing a fragment.
    pub fn into_url_map(self) -> AssetUrlMap {
        self.items
            .into_iter()
            .filter_map(|(id, item)| match (item.url_location, item.url_path) {
                (Some(location), Some(path)) if !location.is_empty() && !path.is_empty() => {
                    Some((id, format!("https://{}{}", location, path)))
                }
                _ => {
                    tracing::warn!("Missing url_location or url_path for id {}", id);
                    None
                }
            })
            .collect()
    }
}

/// Opaque id → fully-qualified asset URL.
///
/// Keys are photo guids or derivative checksums, depending on what the
/// server chose to return. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetUrlMap(HashMap<String, String>);

impl AssetUrlMap {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for AssetUrlMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Something worth telling the caller about an otherwise successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchWarning {
    /// The asset-URL endpoint answered 400; photos carry no URLs.
    AssetUrlsDegraded,
    /// The asset-URL lookup failed after retries; photos carry no URLs.
    AssetUrlsUnavailable(String),
}

impl std::fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchWarning::AssetUrlsDegraded => {
                write!(f, "asset URL lookup was rejected (HTTP 400); no download URLs")
            }
            FetchWarning::AssetUrlsUnavailable(reason) => {
                write!(f, "asset URL lookup failed: {}; no download URLs", reason)
            }
        }
    }
}

/// A fetched album.
#[derive(Debug, Clone)]
pub struct Album {
    pub metadata: StreamMetadata,
    /// In server order.
    pub photos: Vec<Photo>,
    pub warnings: Vec<FetchWarning>,
}
