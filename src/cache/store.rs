//! Persistent key/value storage with per-entry expiry, SQLite-backed.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// The three logical partitions of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
  /// Single resources keyed by `type_id`.
  Elements,
  /// Ordered member-key sequences keyed by list key.
  Lists,
  /// Reverse index: element key -> list keys containing it.
  Indexes,
}

impl Partition {
  pub const ALL: [Partition; 3] = [Partition::Elements, Partition::Lists, Partition::Indexes];

  fn table(&self) -> &'static str {
    match self {
      Partition::Elements => "elements",
      Partition::Lists => "lists",
      Partition::Indexes => "indexes",
    }
  }
}

/// Schema for the cache partitions.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS elements (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    expires_at INTEGER
);

CREATE TABLE IF NOT EXISTS lists (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    expires_at INTEGER
);

CREATE TABLE IF NOT EXISTS indexes (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    expires_at INTEGER
);
"#;

/// SQLite-backed store. Entries whose expiry is in the past are treated as
/// absent and purged lazily on read; there is no background sweep.
pub struct CacheStore {
  conn: Mutex<Connection>,
}

impl CacheStore {
  /// Open (or create) the store at `path`.
  ///
  /// Failure here is fatal: the cache never falls back to an in-memory
  /// database unless the caller opts in via [`CacheStore::open_in_memory`].
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| Error::StorageUnavailable(format!("cannot create {}: {}", parent.display(), e)))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| Error::StorageUnavailable(format!("cannot open {}: {}", path.display(), e)))?;

    debug!(path = %path.display(), "opened cache store");
    Self::from_connection(conn)
  }

  /// Open the store at the platform data directory for `application_name`.
  pub fn open_default(application_name: &str) -> Result<Self> {
    Self::open(&Self::default_path(application_name)?)
  }

  /// Explicit opt-in to a non-durable cache; also used by tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| Error::StorageUnavailable(format!("cannot open in-memory store: {}", e)))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  fn default_path(application_name: &str) -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| Error::StorageUnavailable("could not determine data directory".to_string()))?;

    Ok(data_dir.join(application_name).join("cache.db"))
  }

  fn run_migrations(&self) -> Result<()> {
    let conn = self.lock()?;
    conn.execute_batch(CACHE_SCHEMA)?;
    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| Error::StorageUnavailable(format!("lock poisoned: {}", e)))
  }

  /// Store `value` under `key`. A zero `ttl_millis` means the entry never
  /// expires; otherwise it expires `ttl_millis` from now.
  pub fn set<T: Serialize>(
    &self,
    partition: Partition,
    key: &str,
    value: &T,
    ttl_millis: u64,
  ) -> Result<()> {
    let expires_at = match ttl_millis {
      0 => None,
      ttl => Some(Utc::now().timestamp_millis() + ttl as i64),
    };
    let data = serde_json::to_vec(value)?;

    let conn = self.lock()?;
    conn.execute(
      &format!(
        "INSERT OR REPLACE INTO {} (key, value, expires_at) VALUES (?, ?, ?)",
        partition.table()
      ),
      params![key, data, expires_at],
    )?;

    Ok(())
  }

  /// Fetch the value under `key`, purging it as a side effect if expired.
  pub fn get<T: DeserializeOwned>(&self, partition: Partition, key: &str) -> Result<Option<T>> {
    let row: Option<(Vec<u8>, Option<i64>)> = {
      let conn = self.lock()?;
      conn
        .query_row(
          &format!("SELECT value, expires_at FROM {} WHERE key = ?", partition.table()),
          params![key],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
    };

    let (data, expires_at) = match row {
      Some(row) => row,
      None => return Ok(None),
    };

    if let Some(expires_at) = expires_at {
      if Utc::now().timestamp_millis() > expires_at {
        debug!(key, partition = partition.table(), "purging expired entry");
        self.delete(partition, key)?;
        return Ok(None);
      }
    }

    Ok(Some(serde_json::from_slice(&data)?))
  }

  pub fn delete(&self, partition: Partition, key: &str) -> Result<()> {
    let conn = self.lock()?;
    conn.execute(
      &format!("DELETE FROM {} WHERE key = ?", partition.table()),
      params![key],
    )?;
    Ok(())
  }

  pub fn clear(&self, partition: Partition) -> Result<()> {
    let conn = self.lock()?;
    conn.execute(&format!("DELETE FROM {}", partition.table()), [])?;
    Ok(())
  }

  pub fn clear_all(&self) -> Result<()> {
    for partition in Partition::ALL {
      self.clear(partition)?;
    }
    Ok(())
  }
}
