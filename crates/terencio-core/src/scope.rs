//! The active scope: which company, and optionally which store, the console
//! is currently looking at.

use std::sync::Arc;

use serde::Serialize;

use crate::{
  identity::{Company, CompanyId, Store, StoreId},
  route::{company_path, store_path},
};

/// The currently selected `(company, store)` pair.
///
/// The store is held by id and looked up inside the active company, so a
/// store that does not belong to the company can never be observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveScope {
  company:  Option<Arc<Company>>,
  store_id: Option<StoreId>,
}

impl ActiveScope {
  /// Scope with no company and no store.
  pub fn empty() -> Self { Self::default() }

  /// Scope for `company` with no store selected.
  pub fn company(company: Arc<Company>) -> Self {
    Self { company: Some(company), store_id: None }
  }

  /// Build a scope, dropping `store_id` when it is not one of the company's
  /// stores.
  pub fn new(company: Option<Arc<Company>>, store_id: Option<StoreId>) -> Self {
    let store_id = match (&company, store_id) {
      (Some(c), Some(id)) if c.contains_store(id) => Some(id),
      _ => None,
    };
    Self { company, store_id }
  }

  pub fn active_company(&self) -> Option<&Arc<Company>> { self.company.as_ref() }

  pub fn active_store(&self) -> Option<&Store> {
    let id = self.store_id?;
    self.company.as_deref()?.store_by_id(id)
  }

  pub fn company_id(&self) -> Option<CompanyId> { self.company.as_ref().map(|c| c.id) }

  pub fn store_id(&self) -> Option<StoreId> { self.store_id }

  pub fn is_empty(&self) -> bool { self.company.is_none() }

  /// Same company and store by id.
  pub fn same_selection(&self, other: &Self) -> bool {
    self.company_id() == other.company_id() && self.store_id == other.store_id
  }

  /// Base path encoding this scope: `/{company}` or `/{company}/{store}`.
  pub fn path(&self) -> Option<String> {
    let company = self.active_company()?;
    Some(match self.active_store() {
      Some(store) => store_path(company, store),
      None => company_path(company),
    })
  }

  pub(crate) fn with_store(&self, store_id: Option<StoreId>) -> Self {
    Self::new(self.company.clone(), store_id)
  }

  /// Flatten into the ids/slugs/names view handed to feature views.
  pub fn context(&self) -> ActiveContext {
    let company = self.active_company();
    let store = self.active_store();
    ActiveContext {
      company_id:   company.map(|c| c.id),
      company_slug: company.map(|c| c.slug.clone()),
      company_name: company.map(|c| c.name.clone()),
      store_id:     store.map(|s| s.id),
      store_slug:   store.map(|s| s.slug.clone()),
      store_name:   store.map(|s| s.name.clone()),
    }
  }
}

/// Ids for API calls, slugs for URL construction and names for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContext {
  pub company_id:   Option<CompanyId>,
  pub company_slug: Option<String>,
  pub company_name: Option<String>,
  pub store_id:     Option<StoreId>,
  pub store_slug:   Option<String>,
  pub store_name:   Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::identity::fixtures::company;

  #[test]
  fn new_drops_store_of_other_company() {
    let acme = company("acme", &["downtown"]);
    let globex = company("globex", &["harbor"]);
    let scope = ActiveScope::new(Some(acme.clone()), Some(globex.stores[0].id));
    assert_eq!(scope.company_id(), Some(acme.id));
    assert!(scope.active_store().is_none());
    assert!(scope.store_id().is_none());
  }

  #[test]
  fn store_without_company_is_dropped() {
    let acme = company("acme", &["downtown"]);
    let scope = ActiveScope::new(None, Some(acme.stores[0].id));
    assert!(scope.is_empty());
    assert!(scope.store_id().is_none());
  }

  #[test]
  fn context_flattens_company_and_store() {
    let acme = company("acme", &["downtown"]);
    let scope = ActiveScope::new(Some(acme.clone()), Some(acme.stores[0].id));
    let ctx = scope.context();
    assert_eq!(ctx.company_slug.as_deref(), Some("acme"));
    assert_eq!(ctx.store_slug.as_deref(), Some("downtown"));
    assert_eq!(ctx.store_name.as_deref(), Some("Store downtown"));
    assert_eq!(scope.path().as_deref(), Some("/acme/downtown"));
  }
}
