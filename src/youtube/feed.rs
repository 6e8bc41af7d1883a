//! Per-channel feed fetching and parsing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use tracing::{debug, warn};

use crate::error::{Result, SubfeedError};
use crate::youtube::http::{HttpClient, RequestProfile};
use crate::youtube::types::{ChannelFeed, FeedEntry};

/// Base URL of the per-channel Atom feed.
pub const FEED_BASE_URL: &str = "https://www.youtube.com/feeds/videos.xml";

/// Name used for entries when the feed carries no channel name.
pub const UNKNOWN_CHANNEL_NAME: &str = "Unknown";

const VIDEO_ID_PREFIX: &str = "yt:video:";

/// Feed URL for a channel.
pub fn feed_url(channel_id: &str) -> String {
    format!(
        "{}?channel_id={}",
        FEED_BASE_URL,
        urlencoding::encode(channel_id)
    )
}

/// Watch page URL for a video.
pub fn watch_url(video_id: &str) -> String {
    format!(
        "https://www.youtube.com/watch?v={}",
        urlencoding::encode(video_id)
    )
}

/// Thumbnail used when the feed lists none.
pub fn default_thumbnail(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id)
}

/// Parse a channel feed document.
///
/// Entries without a recognizable video id are skipped.
pub fn parse_channel_feed(bytes: &[u8], channel_id: &str) -> Result<ChannelFeed> {
    let feed = parser::parse(bytes)
        .map_err(|e| SubfeedError::Feed(format!("failed to parse feed: {}", e)))?;

    let name = feed
        .authors
        .first()
        .map(|a| a.name.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| {
            feed.title
                .map(|t| t.content.trim().to_string())
                .filter(|t| !t.is_empty())
        });
    let channel_name = name.as_deref().unwrap_or(UNKNOWN_CHANNEL_NAME);

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| to_feed_entry(entry, channel_id, channel_name))
        .collect();

    Ok(ChannelFeed { name, entries })
}

fn to_feed_entry(entry: Entry, channel_id: &str, channel_name: &str) -> Option<FeedEntry> {
    let Some(video_id) = video_id(&entry) else {
        debug!("Skipping feed entry without video id: {}", entry.id);
        return None;
    };

    let media = entry.media.first();

    let title = media
        .and_then(|m| m.title.as_ref())
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| entry.title.as_ref().map(|t| t.content.trim().to_string()))
        .unwrap_or_default();

    let thumbnail_url = media
        .and_then(|m| m.thumbnails.first())
        .map(|t| t.image.uri.clone())
        .unwrap_or_else(|| default_thumbnail(&video_id));

    let description = media
        .and_then(|m| m.description.as_ref())
        .map(|d| d.content.clone())
        .or_else(|| entry.summary.as_ref().map(|s| s.content.clone()))
        .filter(|d| !d.trim().is_empty());

    // Epoch when the feed carries no timestamp at all.
    let published_at = entry
        .published
        .or(entry.updated)
        .unwrap_or_else(DateTime::<Utc>::default);

    Some(FeedEntry {
        link: watch_url(&video_id),
        video_id,
        title,
        thumbnail_url,
        published_at,
        description,
        channel_id: channel_id.to_string(),
        channel_name: channel_name.to_string(),
        channel_thumbnail: None,
    })
}

/// Video id from the entry id, falling back to the `v` parameter of its link.
fn video_id(entry: &Entry) -> Option<String> {
    if let Some(id) = entry.id.strip_prefix(VIDEO_ID_PREFIX) {
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    entry.links.iter().find_map(|link| {
        let url = url::Url::parse(&link.href).ok()?;
        url.query_pairs()
            .find(|(key, value)| key == "v" && !value.is_empty())
            .map(|(_, value)| value.into_owned())
    })
}

/// Fetches channel feeds through an [`HttpClient`].
#[derive(Clone)]
pub struct FeedFetcher {
    client: Arc<dyn HttpClient>,
}

impl FeedFetcher {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }

    /// Fetch and parse one channel's feed.
    pub async fn fetch_channel_feed(&self, channel_id: &str) -> Result<ChannelFeed> {
        let bytes = self
            .client
            .get(&feed_url(channel_id), RequestProfile::Feed)
            .await?;
        parse_channel_feed(&bytes, channel_id)
    }

    /// Fetch one channel's entries for aggregation.
    ///
    /// Never fails: any error is logged and yields an empty list.
    pub async fn fetch_source(&self, channel_id: &str) -> Vec<FeedEntry> {
        match self.fetch_channel_feed(channel_id).await {
            Ok(feed) => {
                debug!(
                    "Fetched {} entries for channel {}",
                    feed.entries.len(),
                    channel_id
                );
                feed.entries
            }
            Err(e) => {
                warn!("Failed to fetch feed for channel {}: {}", channel_id, e);
                Vec::new()
            }
        }
    }
}
