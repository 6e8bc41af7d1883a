//! YouTube access: HTTP seam, channel feeds and channel resolution.

pub mod feed;
pub mod http;
pub mod resolver;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

pub use feed::{feed_url, parse_channel_feed, FeedFetcher};
pub use http::{HttpClient, ReqwestHttpClient, RequestProfile};
pub use resolver::{normalize_input, ChannelResolver, ResolveError};
pub use types::{ChannelFeed, FeedEntry, ResolvedChannel};
