//! Subscribed channel storage.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::parse_datetime;
use crate::{Result, SubfeedError};

/// A subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    /// Platform channel id.
    pub channel_id: String,
    pub name: String,
    pub handle: Option<String>,
    pub thumbnail_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Data for subscribing to a channel.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub channel_id: String,
    pub name: String,
    pub handle: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl NewChannel {
    pub fn new(channel_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            name: name.into(),
            handle: None,
            thumbnail_url: None,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ChannelRow {
    id: i64,
    channel_id: String,
    name: String,
    handle: Option<String>,
    thumbnail_url: Option<String>,
    added_at: String,
}

impl From<ChannelRow> for Channel {
    fn from(row: ChannelRow) -> Self {
        Channel {
            id: row.id,
            channel_id: row.channel_id,
            name: row.name,
            handle: row.handle,
            thumbnail_url: row.thumbnail_url,
            added_at: parse_datetime(&row.added_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All channels, most recently added first.
    pub async fn list(&self) -> Result<Vec<Channel>> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, channel_id, name, handle, thumbnail_url, added_at
            FROM channels
            ORDER BY added_at DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Channel::from).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Channel>> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, channel_id, name, handle, thumbnail_url, added_at
            FROM channels
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Channel::from))
    }

    /// Whether a channel with this platform id is already stored.
    pub async fn exists(&self, channel_id: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM channels WHERE channel_id = ?")
            .bind(channel_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Insert a channel.
    ///
    /// Fails with [`SubfeedError::Conflict`] when the platform id is taken.
    pub async fn create(&self, channel: &NewChannel) -> Result<Channel> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO channels (channel_id, name, handle, thumbnail_url)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&channel.channel_id)
        .bind(&channel.name)
        .bind(&channel.handle)
        .bind(&channel.thumbnail_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return SubfeedError::Conflict("channel".to_string());
                }
            }
            SubfeedError::from(e)
        })?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| SubfeedError::NotFound("channel".to_string()))
    }

    /// Delete a channel. Returns `false` when no row matched.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
