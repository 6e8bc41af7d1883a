//! Combined, cached feed over every subscribed channel.
//!
//! A full refresh fetches all sources concurrently and caches the merged,
//! newest-first list until the next scheduled update. Adding or removing a
//! channel patches the cached list in place instead of refetching the rest.
//!
//! Refreshes and patches run under one lock, so a patch that arrives while a
//! refresh is in flight is applied to the refreshed list.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::feed::Source;
use crate::schedule::ScheduleClock;
use crate::youtube::{FeedEntry, FeedFetcher};

/// Cache key for the combined feed.
pub const FEED_CACHE_KEY: &str = "aggregated_feed";

/// Builds and maintains the combined feed.
pub struct FeedAggregator {
    fetcher: FeedFetcher,
    cache: Arc<TtlCache>,
    clock: ScheduleClock,
    source_timeout: Duration,
    /// Serializes writes of the cached list.
    update_lock: Mutex<()>,
}

impl FeedAggregator {
    pub fn new(
        fetcher: FeedFetcher,
        cache: Arc<TtlCache>,
        clock: ScheduleClock,
        source_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache,
            clock,
            source_timeout,
            update_lock: Mutex::new(()),
        }
    }

    /// When the cached feed next expires.
    pub fn next_update_at(&self) -> DateTime<Utc> {
        self.clock.next_scheduled_time()
    }

    /// Get the combined feed for `sources`, newest first.
    ///
    /// Served from cache when valid. Otherwise every source is fetched
    /// concurrently; sources that fail or time out contribute nothing.
    pub async fn get_aggregate(&self, sources: &[Source]) -> Arc<Vec<FeedEntry>> {
        if sources.is_empty() {
            return Arc::new(Vec::new());
        }

        if let Some(cached) = self.cached() {
            debug!("Feed cache hit ({} entries)", cached.len());
            return cached;
        }

        let _guard = self.update_lock.lock().await;

        // Another refresh may have finished while waiting.
        if let Some(cached) = self.cached() {
            debug!("Feed refreshed by a concurrent request");
            return cached;
        }

        info!("Refreshing feed for {} channel(s)", sources.len());
        let contributions = join_all(sources.iter().map(|s| self.fetch_tagged(s))).await;

        let mut entries: Vec<FeedEntry> = contributions.into_iter().flatten().collect();
        sort_newest_first(&mut entries);

        info!("Feed refreshed with {} entries", entries.len());
        self.store(entries)
    }

    /// Merge a newly added channel into the cached feed.
    ///
    /// Does nothing when no valid feed is cached; the next read refreshes.
    pub async fn on_source_added(&self, source: &Source) {
        let _guard = self.update_lock.lock().await;

        if self.cached().is_none() {
            debug!("No cached feed, skipping merge for {}", source.channel_id);
            return;
        }

        let fresh = self.fetch_tagged(source).await;

        // Re-read after the fetch: the cache may have expired meanwhile.
        let Some(cached) = self.cached() else {
            debug!("Cached feed expired while fetching {}", source.channel_id);
            return;
        };

        let mut merged: Vec<FeedEntry> = cached
            .iter()
            .filter(|e| e.channel_id != source.channel_id)
            .cloned()
            .collect();
        let added = fresh.len();
        merged.extend(fresh);
        sort_newest_first(&mut merged);

        debug!(
            "Merged {} entries from {} into cached feed",
            added, source.channel_id
        );
        self.store(merged);
    }

    /// Drop a removed channel's entries from the cached feed.
    pub async fn on_source_removed(&self, channel_id: &str) {
        let _guard = self.update_lock.lock().await;

        let Some(cached) = self.cached() else {
            return;
        };

        let remaining: Vec<FeedEntry> = cached
            .iter()
            .filter(|e| e.channel_id != channel_id)
            .cloned()
            .collect();

        debug!(
            "Removed {} entries of {} from cached feed",
            cached.len() - remaining.len(),
            channel_id
        );
        self.store(remaining);
    }

    fn cached(&self) -> Option<Arc<Vec<FeedEntry>>> {
        self.cache.get::<Vec<FeedEntry>>(FEED_CACHE_KEY)
    }

    fn store(&self, entries: Vec<FeedEntry>) -> Arc<Vec<FeedEntry>> {
        let ttl = Duration::from_millis(self.clock.ms_until_next_update());
        self.cache.set(FEED_CACHE_KEY, entries, ttl)
    }

    /// Fetch one source within the per-source bound and tag its entries.
    async fn fetch_tagged(&self, source: &Source) -> Vec<FeedEntry> {
        let entries = match tokio::time::timeout(
            self.source_timeout,
            self.fetcher.fetch_source(&source.channel_id),
        )
        .await
        {
            Ok(entries) => entries,
            Err(_) => {
                warn!(
                    "Timed out fetching channel {} after {:?}",
                    source.channel_id, self.source_timeout
                );
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .map(|entry| FeedEntry {
                channel_thumbnail: source.thumbnail_url.clone(),
                ..entry
            })
            .collect()
    }
}

/// Stable sort, newest first. Equal timestamps keep their input order.
pub fn sort_newest_first(entries: &mut [FeedEntry]) {
    entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}
