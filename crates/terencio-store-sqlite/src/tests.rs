//! Tests for `SqliteScopeStorage`, mostly against an in-memory database.

use std::sync::Arc;

use terencio_core::{
  identity::{Company, CompanyId, Store, StoreId},
  persist::{SCOPE_STORAGE_KEY, ScopeStorage},
  store::ScopeStore,
};
use uuid::Uuid;

use crate::SqliteScopeStorage;

fn storage() -> SqliteScopeStorage {
  SqliteScopeStorage::open_in_memory().expect("in-memory storage")
}

fn acme() -> Arc<Company> {
  Arc::new(Company {
    id:     CompanyId(Uuid::new_v4()),
    name:   "Acme Retail".into(),
    slug:   "acme".into(),
    stores: vec![
      Store { id: StoreId(Uuid::new_v4()), name: "Downtown".into(), slug: "downtown".into() },
      Store { id: StoreId(Uuid::new_v4()), name: "Uptown".into(), slug: "uptown".into() },
    ],
  })
}

// ─── Key/value ───────────────────────────────────────────────────────────────

#[test]
fn missing_key_reads_none() {
  let s = storage();
  assert!(s.read("nope").unwrap().is_none());
  assert!(s.updated_at("nope").unwrap().is_none());
}

#[test]
fn write_then_read() {
  let mut s = storage();
  s.write("k", "v1").unwrap();
  assert_eq!(s.read("k").unwrap().as_deref(), Some("v1"));
  assert!(s.updated_at("k").unwrap().is_some());
}

#[test]
fn write_overwrites_existing_value() {
  let mut s = storage();
  s.write("k", "v1").unwrap();
  let first = s.updated_at("k").unwrap().unwrap();
  s.write("k", "v2").unwrap();
  assert_eq!(s.read("k").unwrap().as_deref(), Some("v2"));
  assert!(s.updated_at("k").unwrap().unwrap() >= first);
}

#[test]
fn remove_deletes_only_that_key() {
  let mut s = storage();
  s.write("a", "1").unwrap();
  s.write("b", "2").unwrap();
  s.remove("a").unwrap();
  assert!(s.read("a").unwrap().is_none());
  assert_eq!(s.read("b").unwrap().as_deref(), Some("2"));
  // Removing again is not an error.
  s.remove("a").unwrap();
}

// ─── Through the scope store ─────────────────────────────────────────────────

#[test]
fn scope_survives_fresh_store_instance() {
  let company = acme();
  let mut store = ScopeStore::new(storage());
  store.set_active_company(Some(company.clone())).unwrap();
  store.set_active_store(Some(&company.stores[1])).unwrap();

  let mut fresh = ScopeStore::new(store.into_storage());
  let record = fresh.hydrate();
  assert_eq!(record.active_company_id, Some(company.id));
  assert_eq!(record.active_store_id, Some(company.stores[1].id));
}

#[test]
fn corrupt_row_hydrates_as_empty() {
  let mut s = storage();
  s.write(SCOPE_STORAGE_KEY, "{\"activeCompanyId\": true}").unwrap();
  let mut store = ScopeStore::new(s);
  assert!(store.hydrate().is_empty());
}

#[test]
fn clear_deletes_row() {
  let company = acme();
  let mut store = ScopeStore::new(storage());
  store.set_active_company(Some(company)).unwrap();
  store.clear().unwrap();
  assert!(store.into_storage().read(SCOPE_STORAGE_KEY).unwrap().is_none());
}

#[test]
fn file_storage_persists_across_connections() {
  let dir = std::env::temp_dir().join(format!("terencio-test-{}", Uuid::new_v4()));
  let path = dir.join("scope.db");
  let company = acme();

  {
    let mut store = ScopeStore::new(SqliteScopeStorage::open(&path).unwrap());
    store.set_active_company(Some(company.clone())).unwrap();
  }

  let mut reopened = ScopeStore::new(SqliteScopeStorage::open(&path).unwrap());
  assert_eq!(reopened.hydrate().active_company_id, Some(company.id));

  drop(reopened);
  std::fs::remove_dir_all(&dir).ok();
}
