//! [`ScopeStore`]: the single source of truth for the active scope.
//!
//! Every mutation is written through to the backing [`ScopeStorage`] before
//! the in-memory value changes. If the write fails the error is returned and
//! the store keeps its previous value.

use std::sync::Arc;

use crate::{
  Error, Result,
  identity::{Company, Store},
  persist::{PersistedScope, SCOPE_STORAGE_KEY, ScopeStorage},
  scope::ActiveScope,
};

/// Outcome of [`ScopeStore::set_active_store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
  Applied,
  /// No company is active, or the store belongs to a different company.
  Rejected,
}

/// Holds the active `(company, store)` pair and persists it.
#[derive(Debug)]
pub struct ScopeStore<S> {
  storage:   S,
  key:       String,
  scope:     ActiveScope,
  persisted: PersistedScope,
}

impl<S: ScopeStorage> ScopeStore<S> {
  /// Create a store over `storage` using the default record key.
  pub fn new(storage: S) -> Self { Self::with_key(storage, SCOPE_STORAGE_KEY) }

  pub fn with_key(storage: S, key: impl Into<String>) -> Self {
    Self {
      storage,
      key: key.into(),
      scope: ActiveScope::empty(),
      persisted: PersistedScope::default(),
    }
  }

  /// Load the persisted record. Call once at startup, before the first
  /// resolution.
  ///
  /// The record only carries ids; they are kept as a hint and turned back
  /// into a scope by the resolver once the identity is known. A read failure
  /// or an unreadable record hydrates as empty.
  pub fn hydrate(&mut self) -> PersistedScope {
    self.persisted = match self.storage.read(&self.key) {
      Ok(Some(raw)) => PersistedScope::decode(&raw),
      Ok(None) => PersistedScope::default(),
      Err(e) => {
        tracing::warn!(error = %e, key = %self.key, "failed to read persisted scope");
        PersistedScope::default()
      }
    };
    tracing::debug!(record = ?self.persisted, "hydrated scope store");
    self.persisted
  }

  /// The current scope. Never fails.
  pub fn active_scope(&self) -> ActiveScope { self.scope.clone() }

  /// Borrowing variant of [`active_scope`](Self::active_scope).
  pub fn scope(&self) -> &ActiveScope { &self.scope }

  /// The last record hydrated from or written to storage.
  pub fn persisted(&self) -> PersistedScope { self.persisted }

  /// Replace the active company and clear the active store. `None` clears the
  /// scope entirely.
  pub fn set_active_company(&mut self, company: Option<Arc<Company>>) -> Result<()> {
    self.commit(ActiveScope::new(company, None))
  }

  /// Select `store` within the active company, or clear the store with
  /// `None`.
  ///
  /// Selecting a store with no active company, or one belonging to another
  /// company, changes nothing and returns [`StoreChange::Rejected`].
  pub fn set_active_store(&mut self, store: Option<&Store>) -> Result<StoreChange> {
    let Some(company) = self.scope.active_company() else {
      tracing::warn!(
        store = ?store.map(|s| &s.slug),
        "rejected store selection: no active company"
      );
      return Ok(StoreChange::Rejected);
    };

    if let Some(store) = store
      && !company.contains_store(store.id)
    {
      tracing::warn!(
        company = %company.slug,
        store = %store.slug,
        "rejected store selection: store belongs to another company"
      );
      return Ok(StoreChange::Rejected);
    }

    let next = self.scope.with_store(store.map(|s| s.id));
    self.commit(next)?;
    Ok(StoreChange::Applied)
  }

  /// Overwrite the whole scope. Used by the resolver, which has already
  /// checked the pair against the identity tree.
  pub(crate) fn replace(&mut self, scope: ActiveScope) -> Result<()> { self.commit(scope) }

  /// Drop the in-memory scope without touching storage. The persisted record
  /// stays as the fallback hint for the next resolution.
  pub(crate) fn forget(&mut self) {
    self.scope = ActiveScope::empty();
    tracing::debug!("dropped in-memory scope");
  }

  /// Forget the scope and delete the persisted record (logout).
  pub fn clear(&mut self) -> Result<()> {
    self.storage.remove(&self.key).map_err(Error::storage)?;
    self.scope = ActiveScope::empty();
    self.persisted = PersistedScope::default();
    tracing::debug!("cleared scope store");
    Ok(())
  }

  /// Access the backing storage, e.g. to hand it to a fresh store in tests.
  pub fn into_storage(self) -> S { self.storage }

  fn commit(&mut self, next: ActiveScope) -> Result<()> {
    let record = PersistedScope::from_scope(&next);
    let raw = record.encode()?;
    self.storage.write(&self.key, &raw).map_err(Error::storage)?;

    tracing::debug!(
      company = ?next.active_company().map(|c| &c.slug),
      store = ?next.active_store().map(|s| &s.slug),
      "scope committed"
    );
    self.scope = next;
    self.persisted = record;
    Ok(())
  }
}
