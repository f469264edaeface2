//! Configuration validation and album argument parsing.

use regex::Regex;
use url::Url;

use crate::api::AlbumToken;
use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Upper bound for the per-request timeout.
const MAX_TIMEOUT_SECS: u64 = 600;

/// Upper bound for retries per request.
const MAX_RETRIES: u32 = 10;

/// Upper bound for parallel photo downloads.
const MAX_CONCURRENT_DOWNLOADS: usize = 16;

/// Token shape accepted from the command line.
const TOKEN_PATTERN: &str = r"^[0-9A-Za-z][0-9A-Za-z_-]*$";

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_client(config)?;
    validate_retry(config)?;
    validate_options(config)?;

    Ok(())
}

fn validate_client(config: &Config) -> Result<()> {
    let timeout = config.client.timeout_secs;
    if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
        return Err(Error::ConfigValidation {
            field: "client.timeout_secs".to_string(),
            message: format!(
                "Timeout must be between 1 and {} seconds (got {})",
                MAX_TIMEOUT_SECS, timeout
            ),
        });
    }

    if config.client.user_agent.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "client.user_agent".to_string(),
            message: "User agent cannot be empty".to_string(),
        });
    }

    Ok(())
}

fn validate_retry(config: &Config) -> Result<()> {
    let retry = &config.retry;

    if retry.max_retries > MAX_RETRIES {
        return Err(Error::ConfigValidation {
            field: "retry.max_retries".to_string(),
            message: format!(
                "At most {} retries are allowed (got {})",
                MAX_RETRIES, retry.max_retries
            ),
        });
    }

    if retry.base_delay_ms > retry.max_delay_ms {
        return Err(Error::ConfigValidation {
            field: "retry.base_delay_ms".to_string(),
            message: format!(
                "Base delay ({}ms) exceeds max delay ({}ms)",
                retry.base_delay_ms, retry.max_delay_ms
            ),
        });
    }

    for (field, codes) in [
        ("retry.retryable_codes", &retry.retryable_codes),
        ("retry.permanent_codes", &retry.permanent_codes),
    ] {
        if let Some(code) = codes.iter().find(|c| !(100..=599).contains(*c)) {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: format!("{} is not an HTTP status code", code),
            });
        }
    }

    if let Some(code) = retry
        .retryable_codes
        .iter()
        .find(|c| retry.permanent_codes.contains(*c))
    {
        return Err(Error::ConfigValidation {
            field: "retry.permanent_codes".to_string(),
            message: format!("{} is listed as both retryable and permanent", code),
        });
    }

    Ok(())
}

fn validate_options(config: &Config) -> Result<()> {
    let jobs = config.options.concurrent_downloads;
    if jobs == 0 || jobs > MAX_CONCURRENT_DOWNLOADS {
        return Err(Error::ConfigValidation {
            field: "options.concurrent_downloads".to_string(),
            message: format!(
                "Concurrent downloads must be between 1 and {} (got {})",
                MAX_CONCURRENT_DOWNLOADS, jobs
            ),
        });
    }

    Ok(())
}

/// Extract an album token from a share link or a bare token.
///
/// Share links look like `https://www.icloud.com/sharedalbum/#B0aGWZuqDGHG2hn`;
/// the token is the URL fragment.
pub fn parse_album_token(input: &str) -> Result<AlbumToken> {
    let input = input.trim();

    let candidate = if input.starts_with("http://") || input.starts_with("https://") {
        let url = Url::parse(input)?;

        let is_icloud = url
            .host_str()
            .is_some_and(|host| host == "icloud.com" || host.ends_with(".icloud.com"));
        if !is_icloud {
            return Err(Error::InvalidToken(format!(
                "Not an iCloud shared album link: {}",
                input
            )));
        }

        match url.fragment().filter(|f| !f.is_empty()) {
            Some(fragment) => fragment.to_string(),
            None => {
                return Err(Error::InvalidToken(format!(
                    "Could not find an album token in URL: {}",
                    input
                )))
            }
        }
    } else {
        input.to_string()
    };

    let token_pattern = Regex::new(TOKEN_PATTERN)
        .map_err(|e| Error::Config(format!("Invalid token pattern: {}", e)))?;
    if !token_pattern.is_match(&candidate) {
        return Err(Error::InvalidToken(format!(
            "'{}' is not a valid album token",
            candidate
        )));
    }

    AlbumToken::parse(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = Config::default();
        config.client.timeout_secs = 0;
        tokio_test::assert_err!(validate_config(&config));

        config.client.timeout_secs = 600;
        tokio_test::assert_ok!(validate_config(&config));

        config.client.timeout_secs = 601;
        tokio_test::assert_err!(validate_config(&config));
    }

    #[test]
    fn test_empty_user_agent() {
        let mut config = Config::default();
        config.client.user_agent = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_retry_settings() {
        let mut config = Config::default();
        config.retry.max_retries = 11;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.retry.base_delay_ms = 60_000;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.retry.retryable_codes.push(42);
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.retry.permanent_codes.push(503);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("both retryable and permanent"));
    }

    #[test]
    fn test_invalid_concurrency() {
        let mut config = Config::default();
        config.options.concurrent_downloads = 0;
        assert!(validate_config(&config).is_err());

        config.options.concurrent_downloads = 17;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parse_album_token_direct() {
        assert_eq!(
            parse_album_token("B0aGWZuqDGHG2hn").unwrap().as_str(),
            "B0aGWZuqDGHG2hn"
        );
        assert_eq!(
            parse_album_token("  B0aGWZuqDGHG2hn \n").unwrap().as_str(),
            "B0aGWZuqDGHG2hn"
        );
    }

    #[test]
    fn test_parse_album_token_url() {
        let token = parse_album_token("https://www.icloud.com/sharedalbum/#B0aGWZuqDGHG2hn").unwrap();
        assert_eq!(token.as_str(), "B0aGWZuqDGHG2hn");
        assert_eq!(token.partition(), 12);

        let localized =
            parse_album_token("https://www.icloud.com/sharedalbum/en-us/#B0aGWZuqDGHG2hn").unwrap();
        assert_eq!(localized.as_str(), "B0aGWZuqDGHG2hn");
    }

    #[test]
    fn test_parse_album_token_invalid() {
        assert!(parse_album_token("").unwrap_err().is_invalid_token());
        assert!(parse_album_token("-abc").unwrap_err().is_invalid_token());
        assert!(parse_album_token("has space").unwrap_err().is_invalid_token());
        assert!(parse_album_token("https://www.icloud.com/sharedalbum/")
            .unwrap_err()
            .is_invalid_token());
        assert!(parse_album_token("https://example.com/#B0aGWZuqDGHG2hn")
            .unwrap_err()
            .is_invalid_token());
    }
}
