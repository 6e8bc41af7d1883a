//! Outbound HTTP for talking to the video platform.
//!
//! Everything that leaves the process goes through [`HttpClient`], so the
//! feed fetcher and channel resolver can be driven by a fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;

use crate::config::FetchConfig;
use crate::error::{Result, SubfeedError};

/// User agent for feed requests.
const FEED_USER_AGENT: &str = "subfeed/0.1 (feed reader)";

/// User agent for channel page requests.
///
/// Channel pages served to unknown agents omit most of the metadata the
/// resolver looks for.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// How a request should present itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestProfile {
    /// Machine-readable feed document.
    Feed,
    /// HTML page, requested the way a desktop browser would.
    Browser,
}

/// Minimal GET-only HTTP seam.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch `url` and return the response body.
    ///
    /// Non-success statuses are reported as [`SubfeedError::HttpStatus`],
    /// transport failures as [`SubfeedError::Network`].
    async fn get(&self, url: &str, profile: RequestProfile) -> Result<Vec<u8>>;
}

/// [`HttpClient`] backed by reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    max_body_bytes: u64,
}

impl ReqwestHttpClient {
    /// Build a client with the configured timeouts and limits.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| SubfeedError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    fn headers_for(profile: RequestProfile) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match profile {
            RequestProfile::Feed => {
                headers.insert(USER_AGENT, HeaderValue::from_static(FEED_USER_AGENT));
            }
            RequestProfile::Browser => {
                headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
                headers.insert(
                    ACCEPT_LANGUAGE,
                    HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
                );
                headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
            }
        }
        headers
    }

    fn too_large(&self, size: u64) -> SubfeedError {
        SubfeedError::Network(format!(
            "response too large: {} bytes (max {} bytes)",
            size, self.max_body_bytes
        ))
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, profile: RequestProfile) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .headers(Self::headers_for(profile))
            .send()
            .await
            .map_err(|e| SubfeedError::Network(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubfeedError::HttpStatus(status.as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_body_bytes {
                return Err(self.too_large(content_length));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SubfeedError::Network(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_body_bytes {
            return Err(self.too_large(bytes.len() as u64));
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(ReqwestHttpClient::new(&FetchConfig::default()).is_ok());
    }

    #[test]
    fn test_feed_profile_headers() {
        let headers = ReqwestHttpClient::headers_for(RequestProfile::Feed);
        assert_eq!(headers.get(USER_AGENT).unwrap(), FEED_USER_AGENT);
        assert!(headers.get(ACCEPT_LANGUAGE).is_none());
    }

    #[test]
    fn test_browser_profile_headers() {
        let headers = ReqwestHttpClient::headers_for(RequestProfile::Browser);
        let agent = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(agent.starts_with("Mozilla/5.0"));
        assert!(agent.contains("Chrome/120"));
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en-US,en;q=0.9");
    }

    #[test]
    fn test_too_large_message() {
        let client = ReqwestHttpClient::new(&FetchConfig::default()).unwrap();
        let err = client.too_large(10 * 1024 * 1024);
        assert!(matches!(err, SubfeedError::Network(_)));
        assert!(err.to_string().contains("too large"));
    }
}
