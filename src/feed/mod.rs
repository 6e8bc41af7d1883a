//! Combined feed across subscribed channels.

pub mod aggregator;

pub use aggregator::{sort_newest_first, FeedAggregator, FEED_CACHE_KEY};

/// A channel the combined feed is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub channel_id: String,
    /// Avatar copied onto every entry from this channel.
    pub thumbnail_url: Option<String>,
}

impl From<&crate::db::Channel> for Source {
    fn from(channel: &crate::db::Channel) -> Self {
        Self {
            channel_id: channel.channel_id.clone(),
            thumbnail_url: channel.thumbnail_url.clone(),
        }
    }
}
