//! API handlers.

pub mod channels;
pub mod feed;
pub mod watched;

pub use channels::*;
pub use feed::*;
pub use watched::*;

use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::feed::FeedAggregator;
use crate::schedule::ScheduleClock;
use crate::youtube::{ChannelResolver, FeedFetcher, HttpClient, ReqwestHttpClient};
use crate::{Database, Result};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub aggregator: FeedAggregator,
    pub resolver: ChannelResolver,
}

impl AppState {
    /// Wire the feed and resolver over one HTTP client.
    pub fn new(
        db: Database,
        client: Arc<dyn HttpClient>,
        clock: ScheduleClock,
        source_timeout: Duration,
    ) -> Self {
        let cache = Arc::new(TtlCache::new());
        let aggregator =
            FeedAggregator::new(FeedFetcher::new(client.clone()), cache, clock, source_timeout);
        let resolver = ChannelResolver::new(client);

        Self {
            db,
            aggregator,
            resolver,
        }
    }

    /// Build the state from configuration with a real HTTP client.
    pub fn from_config(db: Database, config: &Config) -> Result<Self> {
        let client = Arc::new(ReqwestHttpClient::new(&config.fetch)?);
        let clock = ScheduleClock::from_config(&config.schedule)?;
        Ok(Self::new(
            db,
            client,
            clock,
            Duration::from_secs(config.fetch.source_timeout_secs),
        ))
    }
}
