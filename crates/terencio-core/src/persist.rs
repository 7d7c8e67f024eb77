//! The persisted scope record and the storage abstraction it is written to.
//!
//! Storage is a plain string key/value space, the same shape as browser
//! `localStorage`. The record is fully re-derivable from server data, so a
//! record that fails to decode is treated as absent rather than as an error.

use std::{collections::HashMap, convert::Infallible};

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  identity::{CompanyId, StoreId},
  scope::ActiveScope,
};

/// Default key the scope record is stored under.
pub const SCOPE_STORAGE_KEY: &str = "terencio.scope";

// ─── Record ──────────────────────────────────────────────────────────────────

/// The serialised form of an [`ActiveScope`]: ids only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersistedScope {
  pub active_company_id: Option<CompanyId>,
  pub active_store_id:   Option<StoreId>,
}

impl PersistedScope {
  pub fn from_scope(scope: &ActiveScope) -> Self {
    Self {
      active_company_id: scope.company_id(),
      active_store_id:   scope.store_id(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.active_company_id.is_none() && self.active_store_id.is_none()
  }

  pub fn encode(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  /// Decode a stored record. Never fails: anything unreadable decodes to the
  /// empty record.
  pub fn decode(raw: &str) -> Self {
    match serde_json::from_str(raw) {
      Ok(record) => record,
      Err(e) => {
        tracing::warn!(error = %e, "discarding unreadable persisted scope");
        Self::default()
      }
    }
  }
}

// ─── Storage trait ───────────────────────────────────────────────────────────

/// Durable string key/value storage for the scope record.
///
/// Calls are synchronous: a write has reached the backend when it returns.
pub trait ScopeStorage {
  type Error: std::error::Error + Send + Sync + 'static;

  fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

  fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

  fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

/// Process-local storage; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
  entries: HashMap<String, String>,
}

impl MemoryStorage {
  pub fn new() -> Self { Self::default() }
}

impl ScopeStorage for MemoryStorage {
  type Error = Infallible;

  fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
    Ok(self.entries.get(key).cloned())
  }

  fn write(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
    self.entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
    self.entries.remove(key);
    Ok(())
  }
}
