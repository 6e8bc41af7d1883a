//! Resolve user-supplied channel URLs to a canonical channel.
//!
//! Resolution takes the channel id straight from `/channel/<id>` URLs.
//! Any other platform URL is fetched as a page and run through an ordered
//! list of extractors, first match wins. The id is then confirmed by
//! fetching the channel's feed, which also supplies the display name.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::error::SubfeedError;
use crate::youtube::feed::FeedFetcher;
use crate::youtube::http::{HttpClient, RequestProfile};
use crate::youtube::types::ResolvedChannel;

/// Name used when the feed carries no channel name.
pub const UNKNOWN_RESOLVED_NAME: &str = "Unknown channel";

/// Hosts that belong to the platform. Subdomains are accepted too.
const PLATFORM_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

/// Errors reported to the user while resolving a channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("could not find a channel at that URL")]
    NotFound,

    #[error("YouTube could not be reached: {0}")]
    Unreachable(String),
}

static CHANNEL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^UC[a-zA-Z0-9_-]{22}$").expect("valid channel id regex"));

/// Feed autodiscovery `<link>` only.
static RSS_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<link[^>]+type="application/rss\+xml"[^>]+href="[^"]*channel_id=(UC[a-zA-Z0-9_-]{22})""#,
    )
    .expect("valid rss link regex")
});

static META_ITEMPROP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<meta\s+itemprop="channelId"\s+content="(UC[a-zA-Z0-9_-]{22})""#)
        .expect("valid meta regex")
});

static CANONICAL_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<link\s+rel="canonical"\s+href="https://www\.youtube\.com/channel/(UC[a-zA-Z0-9_-]{22})""#,
    )
    .expect("valid canonical regex")
});

static EXTERNAL_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""externalId":"(UC[a-zA-Z0-9_-]{22})""#).expect("valid externalId regex")
});

static HEADER_RENDERER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""c4TabbedHeaderRenderer":\{[^}]*"channelId":"(UC[a-zA-Z0-9_-]{22})""#)
        .expect("valid header renderer regex")
});

static AVATAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""avatar":\{"thumbnails":\[.*?\{"url":"(https://yt3\.googleusercontent\.com/[^"]+)""#,
    )
    .expect("valid avatar regex")
});

/// One way of finding a channel id in a fetched page.
struct Extractor {
    name: &'static str,
    extract: fn(&str, &Url) -> Option<String>,
}

/// Extractors in priority order.
const EXTRACTORS: &[Extractor] = &[
    Extractor {
        name: "rss-link",
        extract: rss_link,
    },
    Extractor {
        name: "meta-itemprop",
        extract: meta_itemprop,
    },
    Extractor {
        name: "canonical-link",
        extract: canonical_link,
    },
    Extractor {
        name: "external-id",
        extract: external_id,
    },
    Extractor {
        name: "header-renderer",
        extract: header_renderer,
    },
    Extractor {
        name: "browse-id",
        extract: browse_id_for_path,
    },
];

fn rss_link(html: &str, _: &Url) -> Option<String> {
    capture(&RSS_LINK_RE, html)
}

fn meta_itemprop(html: &str, _: &Url) -> Option<String> {
    capture(&META_ITEMPROP_RE, html)
}

fn canonical_link(html: &str, _: &Url) -> Option<String> {
    capture(&CANONICAL_LINK_RE, html)
}

fn external_id(html: &str, _: &Url) -> Option<String> {
    capture(&EXTERNAL_ID_RE, html)
}

fn header_renderer(html: &str, _: &Url) -> Option<String> {
    capture(&HEADER_RENDERER_RE, html)
}

fn capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Match a `browseId` whose object also names the requested page path.
fn browse_id_for_path(html: &str, page_url: &Url) -> Option<String> {
    let path = urlencoding::decode(page_url.path()).ok()?;
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return None;
    }
    let escaped_path = regex::escape(&path.replace('/', "\\/"));
    let pattern = format!(
        r#""browseId":"(UC[a-zA-Z0-9_-]{{22}})"[^}}]*"canonicalBaseUrl":"(?:{}|{})""#,
        escaped_path,
        regex::escape(path)
    );
    let re = Regex::new(&pattern).ok()?;
    capture(&re, html)
}

/// Run the extractors over a page and return the first id found.
pub fn extract_channel_id(html: &str, page_url: &Url) -> Option<String> {
    EXTRACTORS.iter().find_map(|extractor| {
        let id = (extractor.extract)(html, page_url)?;
        debug!("Channel id {} found by {}", id, extractor.name);
        Some(id)
    })
}

/// Extract the channel avatar URL from a channel page.
pub fn extract_avatar(html: &str) -> Option<String> {
    capture(&AVATAR_RE, html)
}

/// Trim input and add a scheme when it has none.
pub fn normalize_input(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn is_platform_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    PLATFORM_HOSTS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

/// Parse normalized input and check that it points at the platform.
pub fn parse_platform_url(input: &str) -> Result<Url, ResolveError> {
    let url = Url::parse(input).map_err(|e| ResolveError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ResolveError::InvalidUrl(format!(
                "unsupported scheme: {}",
                scheme
            )))
        }
    }

    match url.host_str() {
        Some(host) if is_platform_host(host) => Ok(url),
        Some(host) => Err(ResolveError::InvalidUrl(format!(
            "not a YouTube URL: {}",
            host
        ))),
        None => Err(ResolveError::InvalidUrl("URL has no host".to_string())),
    }
}

fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Channel id embedded in a `/channel/<id>` path.
pub fn direct_channel_id(url: &Url) -> Option<String> {
    match path_segments(url).as_slice() {
        ["channel", id, ..] if CHANNEL_ID_RE.is_match(id) => Some((*id).to_string()),
        _ => None,
    }
}

/// `@handle` or `/c/<name>` from a page URL.
pub fn extract_handle(url: &Url) -> Option<String> {
    match path_segments(url).as_slice() {
        [first, ..] if first.starts_with('@') && first.len() > 1 => Some(decode(first)),
        ["c", name, ..] => Some(decode(name)),
        _ => None,
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Channel page URL, used to look up the avatar.
pub fn channel_page_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/channel/{}", channel_id)
}

/// Resolves user input to a [`ResolvedChannel`].
#[derive(Clone)]
pub struct ChannelResolver {
    client: Arc<dyn HttpClient>,
    fetcher: FeedFetcher,
}

impl ChannelResolver {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        let fetcher = FeedFetcher::new(client.clone());
        Self { client, fetcher }
    }

    pub async fn resolve(&self, input: &str) -> Result<ResolvedChannel, ResolveError> {
        let normalized = normalize_input(input);
        let url = parse_platform_url(&normalized)?;

        let (channel_id, handle) = match direct_channel_id(&url) {
            Some(id) => (id, None),
            None => {
                let id = self
                    .scrape_channel_id(&url)
                    .await
                    .ok_or(ResolveError::NotFound)?;
                (id, extract_handle(&url))
            }
        };

        let feed = self
            .fetcher
            .fetch_channel_feed(&channel_id)
            .await
            .map_err(|e| match e {
                SubfeedError::HttpStatus(_) | SubfeedError::Feed(_) => ResolveError::NotFound,
                other => ResolveError::Unreachable(other.to_string()),
            })?;

        let name = feed
            .name
            .unwrap_or_else(|| UNKNOWN_RESOLVED_NAME.to_string());
        let thumbnail_url = self.fetch_avatar(&channel_id).await;

        info!("Resolved {} to channel {} ({})", input.trim(), channel_id, name);

        Ok(ResolvedChannel {
            channel_id,
            name,
            handle,
            thumbnail_url,
        })
    }

    async fn scrape_channel_id(&self, url: &Url) -> Option<String> {
        let body = match self.client.get(url.as_str(), RequestProfile::Browser).await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to fetch channel page {}: {}", url, e);
                return None;
            }
        };
        let html = String::from_utf8_lossy(&body);
        extract_channel_id(&html, url)
    }

    /// Avatar lookup is best-effort.
    async fn fetch_avatar(&self, channel_id: &str) -> Option<String> {
        let body = self
            .client
            .get(&channel_page_url(channel_id), RequestProfile::Browser)
            .await
            .map_err(|e| debug!("Failed to fetch avatar for {}: {}", channel_id, e))
            .ok()?;
        extract_avatar(&String::from_utf8_lossy(&body))
    }
}
