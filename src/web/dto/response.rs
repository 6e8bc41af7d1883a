//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Channel;
use crate::youtube::{FeedEntry, ResolvedChannel};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A stored channel.
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub id: i64,
    pub channel_id: String,
    pub name: String,
    pub handle: Option<String>,
    pub thumbnail_url: Option<String>,
    pub added_at: String,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            channel_id: channel.channel_id,
            name: channel.name,
            handle: channel.handle,
            thumbnail_url: channel.thumbnail_url,
            added_at: channel.added_at.to_rfc3339(),
        }
    }
}

/// Preview of a channel before it is added.
#[derive(Debug, Serialize)]
pub struct ResolvedChannelResponse {
    pub channel_id: String,
    pub name: String,
    pub handle: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Whether the channel is already subscribed.
    pub already_added: bool,
}

impl ResolvedChannelResponse {
    pub fn new(resolved: ResolvedChannel, already_added: bool) -> Self {
        Self {
            channel_id: resolved.channel_id,
            name: resolved.name,
            handle: resolved.handle,
            thumbnail_url: resolved.thumbnail_url,
            already_added,
        }
    }
}

/// A feed entry with the viewer's watched state.
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    #[serde(flatten)]
    pub entry: FeedEntry,
    pub watched: bool,
}

/// The combined feed.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub videos: Vec<VideoResponse>,
    /// When the cached feed will next be refreshed.
    pub next_update_at: DateTime<Utc>,
}

/// Result of a watched update.
#[derive(Debug, Serialize)]
pub struct WatchedResponse {
    pub video_id: String,
    pub watched: bool,
}
