//! Watched video markers.

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::Result;

/// Repository for watched video ids.
pub struct WatchedRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WatchedRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_ids(&self) -> Result<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT video_id FROM watched_videos")
            .fetch_all(self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Mark a video as watched. Marking twice is a no-op.
    pub async fn mark(&self, video_id: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO watched_videos (video_id) VALUES (?)")
            .bind(video_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Clear the watched marker. Returns `false` when the video was not marked.
    pub async fn unmark(&self, video_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM watched_videos WHERE video_id = ?")
            .bind(video_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_mark_and_list() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = WatchedRepository::new(db.pool());

        assert!(repo.list_ids().await.unwrap().is_empty());

        repo.mark("vid1").await.unwrap();
        repo.mark("vid2").await.unwrap();

        let ids = repo.list_ids().await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("vid1"));
        assert!(ids.contains("vid2"));
    }

    #[tokio::test]
    async fn test_mark_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = WatchedRepository::new(db.pool());

        repo.mark("vid1").await.unwrap();
        repo.mark("vid1").await.unwrap();

        assert_eq!(repo.list_ids().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unmark() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = WatchedRepository::new(db.pool());

        repo.mark("vid1").await.unwrap();
        assert!(repo.unmark("vid1").await.unwrap());
        assert!(!repo.unmark("vid1").await.unwrap());
        assert!(repo.list_ids().await.unwrap().is_empty());
    }
}
