//! Value types produced by the YouTube layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single video as it appears in the combined feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    /// Platform video id.
    pub video_id: String,
    pub title: String,
    /// Canonical watch URL.
    pub link: String,
    pub thumbnail_url: String,
    pub published_at: DateTime<Utc>,
    pub description: Option<String>,
    /// Id of the channel the video came from.
    pub channel_id: String,
    pub channel_name: String,
    /// Channel avatar, filled in by the aggregator from the stored channel.
    pub channel_thumbnail: Option<String>,
}

/// One channel's feed document, parsed.
#[derive(Debug, Clone, Default)]
pub struct ChannelFeed {
    /// Channel display name, when the document carries one.
    pub name: Option<String>,
    pub entries: Vec<FeedEntry>,
}

/// Outcome of resolving user input to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedChannel {
    pub channel_id: String,
    pub name: String,
    /// `@handle` or legacy custom name, when the input URL carried one.
    pub handle: Option<String>,
    pub thumbnail_url: Option<String>,
}
