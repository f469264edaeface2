//! Album token validation and partition routing.
//!
//! Every shared album lives on one of forty `pNN-sharedstreams` hosts. The
//! host is derived from the first character of the album token read as a
//! base-62 digit.

use std::fmt;

use crate::error::{Error, Result};

/// Number of shared-stream partitions.
pub const PARTITION_COUNT: u32 = 40;

/// Service domain hosting the partitioned endpoints.
const SERVICE_DOMAIN: &str = "icloud.com";

/// Path segment every shared-stream endpoint ends with.
const STREAM_PATH: &str = "sharedstreams";

/// A validated shared album token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumToken(String);

impl AlbumToken {
    /// Validate a raw token.
    ///
    /// The token must be non-blank and start with an ASCII alphanumeric
    /// character.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidToken("empty token".to_string()));
        }

        let first = raw.chars().next().unwrap_or(' ');
        base62_value(first)?;

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Partition owning this token, always in `1..=40`.
    pub fn partition(&self) -> u32 {
        let first = self.0.chars().next().unwrap_or('0');
        // Validated in `parse`.
        let value = base62_value(first).unwrap_or(0);
        1 + (value % PARTITION_COUNT)
    }
}

impl fmt::Display for AlbumToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a character to its base-62 digit value.
fn base62_value(c: char) -> Result<u32> {
    match c {
        '0'..='9' => Ok(c as u32 - '0' as u32),
        'A'..='Z' => Ok(c as u32 - 'A' as u32 + 10),
        'a'..='z' => Ok(c as u32 - 'a' as u32 + 36),
        _ => Err(Error::InvalidToken(format!(
            "invalid leading character {:?}",
            c
        ))),
    }
}

/// Partition for a raw token.
pub fn partition(token: &str) -> Result<u32> {
    AlbumToken::parse(token).map(|t| t.partition())
}

/// Base URL of a shared stream, ending with a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    /// Endpoint on the partition computed from the token.
    pub fn for_token(token: &AlbumToken) -> Self {
        let host = format!(
            "p{:02}-sharedstreams.{}",
            token.partition(),
            SERVICE_DOMAIN
        );
        Self::with_host(&host, token)
    }

    /// Endpoint on an explicit host, as handed out by a redirect.
    pub fn with_host(host: &str, token: &AlbumToken) -> Self {
        Self {
            base: format!("https://{}/{}/{}/", host, token, STREAM_PATH),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// URL of the album metadata and photo list.
    pub fn stream_url(&self) -> String {
        format!("{}webstream", self.base)
    }

    /// URL of the asset location lookup.
    pub fn asset_urls_url(&self) -> String {
        format!("{}webasseturls", self.base)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base62_value() {
        assert_eq!(base62_value('0').unwrap(), 0);
        assert_eq!(base62_value('9').unwrap(), 9);
        assert_eq!(base62_value('A').unwrap(), 10);
        assert_eq!(base62_value('Z').unwrap(), 35);
        assert_eq!(base62_value('a').unwrap(), 36);
        assert_eq!(base62_value('z').unwrap(), 61);
        assert!(base62_value('#').is_err());
        assert!(base62_value('é').is_err());
    }

    #[test]
    fn test_partition_known_values() {
        assert_eq!(partition("0abc123").unwrap(), 1);
        assert_eq!(partition("Axyz789").unwrap(), 11);
        assert_eq!(partition("atoken123").unwrap(), 37);
        assert_eq!(partition("ztest").unwrap(), 22);
    }

    #[test]
    fn test_partition_in_range_and_depends_on_first_char() {
        let alphabet = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
        for c in alphabet.chars() {
            let short = partition(&c.to_string()).unwrap();
            let long = partition(&format!("{}Zq9-rest", c)).unwrap();
            assert!((1..=PARTITION_COUNT).contains(&short));
            assert_eq!(short, long);
        }
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(partition("").unwrap_err().is_invalid_token());
        assert!(partition("   ").unwrap_err().is_invalid_token());
        assert!(partition("#invalid").unwrap_err().is_invalid_token());
        assert!(partition(" B0aGWZ").unwrap_err().is_invalid_token());
    }

    #[test]
    fn test_endpoint_for_token() {
        let token = AlbumToken::parse("0abc123").unwrap();
        assert_eq!(
            Endpoint::for_token(&token).base_url(),
            "https://p01-sharedstreams.icloud.com/0abc123/sharedstreams/"
        );

        let token = AlbumToken::parse("9test").unwrap();
        let endpoint = Endpoint::for_token(&token);
        assert_eq!(
            endpoint.stream_url(),
            "https://p10-sharedstreams.icloud.com/9test/sharedstreams/webstream"
        );
        assert_eq!(
            endpoint.asset_urls_url(),
            "https://p10-sharedstreams.icloud.com/9test/sharedstreams/webasseturls"
        );
    }

    #[test]
    fn test_endpoint_with_host() {
        let token = AlbumToken::parse("B0aGWZ").unwrap();
        assert_eq!(
            Endpoint::with_host("p23-sharedstreams.icloud.com", &token).base_url(),
            "https://p23-sharedstreams.icloud.com/B0aGWZ/sharedstreams/"
        );
    }
}
