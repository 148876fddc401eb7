//! Query cache - SQLite-backed store of server responses
//!
//! Every read goes through here, keyed by [`QueryKey`]. Entries stay fresh
//! until a mutation invalidates a prefix covering them (or the TTL runs out,
//! since the cache outlives a single invocation). Stale entries are kept so
//! callers can still inspect them, but [`QueryCache::fresh`] ignores them and
//! forces a re-fetch.
//!
//! A persistent cache belongs to one API base URL (its origin); opening it
//! for a different origin empties it first.
//!
//! The cache is written only with completed responses. Observers subscribe
//! to a key prefix and receive [`CacheEvent`]s for overlapping writes.

mod key;
mod serialize;

#[cfg(test)]
mod tests;

pub use key::{Filters, KeyPart, QueryKey};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

/// Cache schema version; bump to drop incompatible stores
const SCHEMA_VERSION: i32 = 3;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("cached value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot create cache directory: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored query result
#[derive(Debug, Clone)]
pub struct CachedQuery {
    pub key: QueryKey,
    pub data: serde_json::Value,
    pub stale: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    /// A query result was stored
    Updated { key: QueryKey },
    /// Entries under `prefix` were marked stale
    Invalidated { prefix: QueryKey, matched: usize },
    /// Every entry was removed
    Cleared,
}

impl CacheEvent {
    fn concerns(&self, prefix: &QueryKey) -> bool {
        match self {
            CacheEvent::Updated { key } => key.starts_with(prefix),
            CacheEvent::Invalidated { prefix: p, .. } => p.overlaps(prefix),
            CacheEvent::Cleared => true,
        }
    }
}

/// Handle returned by [`QueryCache::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    prefix: QueryKey,
    callback: Box<dyn FnMut(&CacheEvent)>,
}

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub stale_entries: usize,
    pub resources: Vec<(String, usize)>,
}

/// The query cache
pub struct QueryCache {
    conn: Connection,
    ttl: Option<Duration>,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl QueryCache {
    /// Open (or create) a persistent cache
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a persistent cache for the server at `origin`
    pub fn open_for(path: &Path, origin: &str) -> Result<Self, CacheError> {
        let mut cache = Self::open(path)?;
        cache.bind_origin(origin)?;
        Ok(cache)
    }

    /// Open a cache that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version != SCHEMA_VERSION {
            conn.execute_batch("DROP TABLE IF EXISTS queries; DROP TABLE IF EXISTS meta;")?;
        }
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS queries (
                key_hash   TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                key        TEXT NOT NULL,
                data       TEXT NOT NULL,
                stale      INTEGER NOT NULL DEFAULT 0,
                fetched_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_queries_name ON queries(name);
            CREATE TABLE IF NOT EXISTS meta (
                name  TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn,
            ttl: None,
            subscribers: Vec::new(),
            next_subscription: 1,
        })
    }

    /// Server whose responses this cache holds, if recorded
    pub fn origin(&self) -> Result<Option<String>, CacheError> {
        Ok(self
            .conn
            .query_row("SELECT value FROM meta WHERE name = 'origin'", [], |row| {
                row.get(0)
            })
            .optional()?)
    }

    /// Record `origin` as the cache's server. Entries of any other (or an
    /// unrecorded) origin are dropped; returns true if that happened.
    pub fn bind_origin(&mut self, origin: &str) -> Result<bool, CacheError> {
        let previous = self.origin()?;
        if previous.as_deref() == Some(origin) {
            return Ok(false);
        }
        tracing::info!(previous = ?previous, origin, "cache bound to new API origin");
        self.clear()?;
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (name, value) VALUES ('origin', ?1)",
            params![origin],
        )?;
        Ok(true)
    }

    /// Treat entries older than `ttl` as stale
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Look up an entry regardless of freshness
    pub fn get(&self, key: &QueryKey) -> Result<Option<CachedQuery>, CacheError> {
        let row = self
            .conn
            .query_row(
                "SELECT key, data, stale, fetched_at FROM queries WHERE key_hash = ?1",
                params![key.hash()],
                |row| {
                    Ok((
                        row.get::<_, QueryKey>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, DateTime<Utc>>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((key, data, stale, fetched_at)) => Ok(Some(CachedQuery {
                key,
                data: serde_json::from_str(&data)?,
                stale,
                fetched_at,
            })),
            None => Ok(None),
        }
    }

    /// Cached data for `key` if present and not stale
    pub fn fresh(&self, key: &QueryKey) -> Result<Option<serde_json::Value>, CacheError> {
        let Some(entry) = self.get(key)? else {
            return Ok(None);
        };
        if entry.stale {
            return Ok(None);
        }
        if let Some(ttl) = self.ttl {
            if Utc::now() - entry.fetched_at > ttl {
                return Ok(None);
            }
        }
        Ok(Some(entry.data))
    }

    /// Store a completed response
    pub fn set(&mut self, key: &QueryKey, data: &serde_json::Value) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO queries (key_hash, name, key, data, stale, fetched_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                key.hash(),
                key.name().unwrap_or_default(),
                key,
                serde_json::to_string(data)?,
                Utc::now(),
            ],
        )?;
        tracing::trace!(key = %key, "cache updated");
        self.notify(&CacheEvent::Updated { key: key.clone() });
        Ok(())
    }

    /// Mark every entry under `prefix` stale, returning how many matched
    pub fn invalidate(&mut self, prefix: &QueryKey) -> Result<usize, CacheError> {
        let hashes = self.matching(prefix)?;
        for hash in &hashes {
            self.conn
                .execute("UPDATE queries SET stale = 1 WHERE key_hash = ?1", params![hash])?;
        }
        tracing::debug!(prefix = %prefix, matched = hashes.len(), "cache invalidated");
        self.notify(&CacheEvent::Invalidated {
            prefix: prefix.clone(),
            matched: hashes.len(),
        });
        Ok(hashes.len())
    }

    /// Drop every entry under `prefix`
    pub fn remove(&mut self, prefix: &QueryKey) -> Result<usize, CacheError> {
        let hashes = self.matching(prefix)?;
        for hash in &hashes {
            self.conn
                .execute("DELETE FROM queries WHERE key_hash = ?1", params![hash])?;
        }
        Ok(hashes.len())
    }

    /// Drop everything
    pub fn clear(&mut self) -> Result<(), CacheError> {
        self.conn.execute("DELETE FROM queries", [])?;
        tracing::debug!("cache cleared");
        self.notify(&CacheEvent::Cleared);
        Ok(())
    }

    fn matching(&self, prefix: &QueryKey) -> Result<Vec<String>, CacheError> {
        let mut rows: Vec<(String, QueryKey)> = Vec::new();
        match prefix.name() {
            Some(name) => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT key_hash, key FROM queries WHERE name = ?1")?;
                let iter = stmt.query_map(params![name], |row| Ok((row.get(0)?, row.get(1)?)))?;
                for row in iter {
                    rows.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare("SELECT key_hash, key FROM queries")?;
                let iter = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                for row in iter {
                    rows.push(row?);
                }
            }
        }

        Ok(rows
            .into_iter()
            .filter(|(_, key)| key.starts_with(prefix))
            .map(|(hash, _)| hash)
            .collect())
    }

    /// Watch a key prefix; the empty key watches everything
    pub fn subscribe<F>(&mut self, prefix: QueryKey, callback: F) -> SubscriptionId
    where
        F: FnMut(&CacheEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            prefix,
            callback: Box::new(callback),
        });
        id
    }

    /// Stop watching; returns false if the id was unknown
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: &CacheEvent) {
        for sub in self.subscribers.iter_mut() {
            if event.concerns(&sub.prefix) {
                (sub.callback)(event);
            }
        }
    }

    /// Entry counts for `settings` output
    pub fn statistics(&self) -> Result<CacheStats, CacheError> {
        let total_entries: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM queries", [], |row| row.get(0))?;
        let stale_entries: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM queries WHERE stale = 1",
            [],
            |row| row.get(0),
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT name, COUNT(*) FROM queries GROUP BY name ORDER BY name")?;
        let resources = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CacheStats {
            total_entries: total_entries as usize,
            stale_entries: stale_entries as usize,
            resources,
        })
    }
}
