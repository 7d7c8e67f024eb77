//! [`SqliteScopeStorage`]: the SQLite implementation of [`ScopeStorage`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _};
use terencio_core::persist::ScopeStorage;

use crate::{
  Result,
  encode::{decode_dt, encode_dt},
  schema::SCHEMA,
};

/// Durable scope storage backed by a single SQLite file.
///
/// Writes are synchronous: when [`ScopeStorage::write`] returns, the row has
/// been committed.
pub struct SqliteScopeStorage {
  conn: Connection,
}

impl SqliteScopeStorage {
  /// Open (or create) the storage file at `path` and run schema
  /// initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let storage = Self { conn: Connection::open(path)? };
    storage.init_schema()?;
    tracing::debug!(path = %path.display(), "opened scope storage");
    Ok(storage)
  }

  /// Open an in-memory storage, for tests.
  pub fn open_in_memory() -> Result<Self> {
    let storage = Self { conn: Connection::open_in_memory()? };
    storage.init_schema()?;
    Ok(storage)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    Ok(())
  }

  /// When `key` was last written, if it exists.
  pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = self
      .conn
      .query_row(
        "SELECT updated_at FROM scope_storage WHERE key = ?1",
        rusqlite::params![key],
        |row| row.get(0),
      )
      .optional()?;

    raw.as_deref().map(decode_dt).transpose()
  }
}

impl ScopeStorage for SqliteScopeStorage {
  type Error = crate::Error;

  fn read(&self, key: &str) -> Result<Option<String>> {
    Ok(
      self
        .conn
        .query_row(
          "SELECT value FROM scope_storage WHERE key = ?1",
          rusqlite::params![key],
          |row| row.get(0),
        )
        .optional()?,
    )
  }

  fn write(&mut self, key: &str, value: &str) -> Result<()> {
    let at = encode_dt(Utc::now());
    self.conn.execute(
      "INSERT INTO scope_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
      rusqlite::params![key, value, at],
    )?;
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<()> {
    self
      .conn
      .execute("DELETE FROM scope_storage WHERE key = ?1", rusqlite::params![key])?;
    Ok(())
  }
}
