//! Translation caching.
//!
//! Cache trouble must never fail a run that the backend could still
//! complete, so the engine talks to [`TranslationCache`], which absorbs
//! store errors: a failed read behaves like a miss and a failed write is
//! reported and dropped.

mod sqlite;

pub use sqlite::{CacheRecord, SqliteCache};

use crate::warn;

/// The cache as seen by the orchestration loop.
pub enum TranslationCache {
    Sqlite(SqliteCache),
    /// Caching turned off: every lookup misses, every store is a no-op.
    Disabled,
}

impl TranslationCache {
    pub fn get(&self, namespace: &str, key: &str) -> Option<String> {
        match self {
            Self::Sqlite(cache) => match cache.get(namespace, key) {
                Ok(hit) => hit,
                Err(err) => {
                    warn!("Warning: cache read failed, translating instead: {err:#}");
                    None
                }
            },
            Self::Disabled => None,
        }
    }

    pub fn put(&self, record: &CacheRecord<'_>) {
        match self {
            Self::Sqlite(cache) => {
                if let Err(err) = cache.put(record) {
                    warn!("Warning: cache write failed, result not stored: {err:#}");
                }
            }
            Self::Disabled => {}
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }
}
