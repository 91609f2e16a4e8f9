use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use rusqlite::Connection;

/// One row of the translation cache, before the store stamps it with a
/// creation time.
#[derive(Debug, Clone, Copy)]
pub struct CacheRecord<'a> {
    pub namespace: &'a str,
    pub key: &'a str,
    pub source_text: &'a str,
    pub translated_text: &'a str,
    pub source_language: &'a str,
    pub target_language: &'a str,
}

/// SQLite-backed translation cache with per-record freshness.
///
/// Records are scoped by namespace so different backends never serve each
/// other's output. A record is fresh while its age is strictly below the
/// configured TTL; stale rows are simply ignored on read and overwritten
/// on the next write.
pub struct SqliteCache {
    db_path: PathBuf,
    ttl: Duration,
}

impl SqliteCache {
    pub fn open(db_path: PathBuf, ttl: Duration) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let cache = Self { db_path, ttl };
        cache.init_db()?;

        Ok(cache)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS translations (
                namespace TEXT NOT NULL,
                cache_key TEXT NOT NULL,
                source_text TEXT NOT NULL,
                translated_text TEXT NOT NULL,
                source_language TEXT NOT NULL,
                target_language TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (namespace, cache_key)
            )",
            [],
        )
        .context("Failed to create translations table")?;

        Ok(())
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open cache database: {}", self.db_path.display()))
    }

    /// Looks up a fresh record, returning its translated text.
    ///
    /// Stale records are treated as a miss.
    pub fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare(
            "SELECT translated_text FROM translations
             WHERE namespace = ?1 AND cache_key = ?2 AND created_at > ?3",
        )?;

        let cutoff = unix_now().saturating_sub(ttl_seconds(self.ttl));
        let result = stmt
            .query_row(rusqlite::params![namespace, key, cutoff], |row| row.get(0))
            .ok();

        Ok(result)
    }

    /// Stores a record, replacing any previous one under the same
    /// namespace and key.
    pub fn put(&self, record: &CacheRecord<'_>) -> Result<()> {
        self.insert(record, unix_now())
    }

    fn insert(&self, record: &CacheRecord<'_>, created_at: i64) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "INSERT OR REPLACE INTO translations
             (namespace, cache_key, source_text, translated_text,
              source_language, target_language, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                record.namespace,
                record.key,
                record.source_text,
                record.translated_text,
                record.source_language,
                record.target_language,
                created_at,
            ],
        )
        .context("Failed to insert translation into cache")?;

        Ok(())
    }
}

fn unix_now() -> i64 {
    let elapsed = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
}

fn ttl_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}
