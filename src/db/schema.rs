//! Database schema and migrations for subfeed.
//!
//! Migrations are applied in order; `schema_version` records which have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: Subscribed channels
    r#"
CREATE TABLE channels (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_id      TEXT NOT NULL UNIQUE,   -- platform id, UC...
    name            TEXT NOT NULL,
    handle          TEXT,                   -- @handle or legacy custom name
    thumbnail_url   TEXT,
    added_at        TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_channels_added_at ON channels(added_at);
"#,
    // v2: Watched videos
    r#"
CREATE TABLE watched_videos (
    video_id    TEXT PRIMARY KEY,
    watched_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_channels_migration() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE channels"));
        assert!(first.contains("channel_id      TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn test_watched_migration() {
        assert!(MIGRATIONS[1].contains("CREATE TABLE watched_videos"));
    }
}
