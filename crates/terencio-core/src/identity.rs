//! Identity: the authenticated user and the company/store tree they may
//! access.
//!
//! The tree is a read-only copy of the server's record. Everything else in
//! this crate refers back into it by id or slug and never copies entries out.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Ids ─────────────────────────────────────────────────────────────────────

/// Opaque identifier of a [`Company`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CompanyId(pub Uuid);

/// Opaque identifier of a [`Store`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StoreId(pub Uuid);

impl fmt::Display for CompanyId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl fmt::Display for StoreId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Tree ────────────────────────────────────────────────────────────────────

/// A physical or operational location belonging to exactly one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
  pub id:   StoreId,
  pub name: String,
  /// URL-safe identifier, unique within the parent company.
  pub slug: String,
}

/// A tenant-like organisational unit and the stores it operates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
  pub id:     CompanyId,
  pub name:   String,
  /// URL-safe identifier, unique among the identity's companies.
  pub slug:   String,
  #[serde(default)]
  pub stores: Vec<Store>,
}

impl Company {
  /// First store whose slug matches exactly (case-sensitive).
  pub fn store_by_slug(&self, slug: &str) -> Option<&Store> {
    self.stores.iter().find(|s| s.slug == slug)
  }

  pub fn store_by_id(&self, id: StoreId) -> Option<&Store> {
    self.stores.iter().find(|s| s.id == id)
  }

  pub fn contains_store(&self, id: StoreId) -> bool {
    self.store_by_id(id).is_some()
  }
}

/// The authenticated user as returned by `GET /api/v1/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub id:              i64,
  pub username:        String,
  pub full_name:       String,
  pub is_active:       bool,
  /// Ordered; the first entry is the default company.
  #[serde(default)]
  pub companies:       Vec<Arc<Company>>,
  #[serde(default)]
  pub last_company_id: Option<CompanyId>,
  #[serde(default)]
  pub last_store_id:   Option<StoreId>,
}

impl Identity {
  /// First company whose slug matches exactly (case-sensitive).
  pub fn company_by_slug(&self, slug: &str) -> Option<&Arc<Company>> {
    self.companies.iter().find(|c| c.slug == slug)
  }

  pub fn company_by_id(&self, id: CompanyId) -> Option<&Arc<Company>> {
    self.companies.iter().find(|c| c.id == id)
  }

  /// Resolve URL slugs against the tree.
  ///
  /// The store slug is only consulted once the company slug has matched, and
  /// a store slug that does not belong to that company resolves to no store.
  pub fn resolve_slugs(
    &self,
    company_slug: &str,
    store_slug: Option<&str>,
  ) -> Option<(&Arc<Company>, Option<&Store>)> {
    let company = self.company_by_slug(company_slug)?;
    let store = store_slug.and_then(|slug| company.store_by_slug(slug));
    Some((company, store))
  }
}

// ─── Provider signal ─────────────────────────────────────────────────────────

/// What the identity provider currently knows about the session.
#[derive(Debug, Clone, Default)]
pub enum IdentityState {
  /// The authentication check has not completed yet.
  #[default]
  Loading,
  /// Not logged in, or the identity fetch failed.
  Anonymous,
  Ready(Arc<Identity>),
}

impl IdentityState {
  pub fn identity(&self) -> Option<&Arc<Identity>> {
    match self {
      Self::Ready(identity) => Some(identity),
      _ => None,
    }
  }

  pub fn is_authenticated(&self) -> bool { matches!(self, Self::Ready(_)) }
}

// ─── Tests ───────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
  use super::{fixtures::*, *};

  #[test]
  fn slug_match_is_case_sensitive() {
    let id = identity(vec![company("acme", &["downtown"])]);
    assert!(id.company_by_slug("acme").is_some());
    assert!(id.company_by_slug("Acme").is_none());
  }

  #[test]
  fn duplicate_slugs_resolve_to_first_entry() {
    let first = company("acme", &[]);
    let second = company("acme", &[]);
    let id = identity(vec![first.clone(), second]);
    assert_eq!(id.company_by_slug("acme").unwrap().id, first.id);
  }

  #[test]
  fn foreign_store_slug_resolves_to_no_store() {
    let id = identity(vec![company("acme", &["downtown"]), company("globex", &["harbor"])]);
    let (company, store) = id.resolve_slugs("acme", Some("harbor")).unwrap();
    assert_eq!(company.slug, "acme");
    assert!(store.is_none());
  }

  #[test]
  fn unknown_company_slug_resolves_to_nothing() {
    let id = identity(vec![company("acme", &["downtown"])]);
    assert!(id.resolve_slugs("not-a-real-slug", Some("downtown")).is_none());
  }

  #[test]
  fn identity_deserialises_from_wire_shape() {
    let json = r#"{
      "id": 3,
      "username": "bob",
      "fullName": "Bob Stone",
      "isActive": true,
      "lastCompanyId": "5f0d7b3e-98a4-4c1e-9d55-0c2a4f1d2b6a",
      "lastStoreId": null,
      "companies": [{
        "id": "5f0d7b3e-98a4-4c1e-9d55-0c2a4f1d2b6a",
        "name": "Acme",
        "slug": "acme",
        "stores": [{
          "id": "0b8e9d2a-1c44-4d8e-a3b1-6f7e2d9c1a55",
          "name": "Downtown",
          "slug": "downtown"
        }]
      }]
    }"#;

    let id: Identity = serde_json::from_str(json).unwrap();
    assert_eq!(id.full_name, "Bob Stone");
    assert_eq!(id.companies.len(), 1);
    assert_eq!(id.last_company_id, Some(id.companies[0].id));
    assert!(id.last_store_id.is_none());
    assert!(id.companies[0].store_by_slug("downtown").is_some());
  }
}
