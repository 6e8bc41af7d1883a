//! subfeed - a personal subscription feed for YouTube channels.
//!
//! Channels are resolved from whatever URL the user pastes, their public
//! feeds are merged into one newest-first timeline, and the merged timeline
//! is cached until the next fixed refresh hour.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod logging;
pub mod schedule;
pub mod web;
pub mod youtube;

pub use cache::TtlCache;
pub use config::Config;
pub use db::{Channel, ChannelRepository, Database, NewChannel, WatchedRepository};
pub use error::{Result, SubfeedError};
pub use feed::{FeedAggregator, Source};
pub use schedule::ScheduleClock;
pub use youtube::{
    ChannelResolver, FeedEntry, FeedFetcher, HttpClient, RequestProfile, ResolveError,
    ResolvedChannel,
};
