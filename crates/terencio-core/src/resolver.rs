//! Scope resolution: turning URL slugs, the persisted selection and the
//! identity's company tree into one authoritative [`ActiveScope`].
//!
//! The first pass after an identity becomes available may fall back to a
//! default scope and rewrite the URL. Every later pass treats the URL as
//! authoritative and only copies it into the store.

use crate::{
  Result,
  identity::{Identity, IdentityState},
  persist::{PersistedScope, ScopeStorage},
  route::{Redirect, ScopeParams},
  scope::ActiveScope,
  store::ScopeStore,
};

/// Outcome of one [`ScopeResolver::resolve`] pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// No identity yet, or it has no companies. Nothing was written.
  Deferred,
  /// The store already matched.
  Unchanged,
  /// The store was overwritten; the URL already encodes the new scope.
  Updated,
  /// The store was overwritten with a fallback scope and the URL must follow.
  Redirect(Redirect),
}

#[derive(Debug, Clone, Default)]
pub struct ScopeResolver {
  initialized: bool,
}

impl ScopeResolver {
  pub fn new() -> Self { Self::default() }

  pub fn is_initialized(&self) -> bool { self.initialized }

  /// Forget the first resolution, e.g. after logout or when a different
  /// identity is loaded.
  pub fn reset(&mut self) { self.initialized = false; }

  /// Run one reconciliation pass. Call it when the identity is loaded and
  /// whenever the path parameters change, not on every render.
  pub fn resolve<S: ScopeStorage>(
    &mut self,
    identity: &IdentityState,
    params: &ScopeParams,
    store: &mut ScopeStore<S>,
  ) -> Result<Resolution> {
    let Some(identity) = identity.identity() else {
      return Ok(Resolution::Deferred);
    };
    if identity.companies.is_empty() {
      tracing::debug!(user = %identity.username, "identity has no companies, deferring");
      return Ok(Resolution::Deferred);
    }

    if self.initialized {
      follow_url(identity, params, store)
    } else {
      let resolution = initialize(identity, params, store)?;
      self.initialized = true;
      Ok(resolution)
    }
  }
}

/// First pass: adopt the URL scope if it resolves, else pick a fallback and
/// ask for the URL to be replaced.
fn initialize<S: ScopeStorage>(
  identity: &Identity,
  params: &ScopeParams,
  store: &mut ScopeStore<S>,
) -> Result<Resolution> {
  let from_url = params
    .company_slug
    .as_deref()
    .and_then(|slug| identity.resolve_slugs(slug, params.store_slug.as_deref()));

  if let Some((company, url_store)) = from_url {
    let next = ActiveScope::new(Some(company.clone()), url_store.map(|s| s.id));
    tracing::debug!(company = %company.slug, "initial scope taken from url");
    let changed = !next.same_selection(store.scope());
    store.replace(next)?;
    return Ok(if changed { Resolution::Updated } else { Resolution::Unchanged });
  }

  let next = fallback_scope(identity, store.persisted());
  let path = next.path().unwrap_or_else(|| crate::route::ROOT_PATH.to_owned());
  tracing::debug!(
    requested = ?params.company_slug,
    redirect = %path,
    "url scope unresolved, using fallback"
  );
  store.replace(next)?;
  Ok(Resolution::Redirect(Redirect::replace(path)))
}

/// Later passes: copy a resolvable URL scope into the store.
fn follow_url<S: ScopeStorage>(
  identity: &Identity,
  params: &ScopeParams,
  store: &mut ScopeStore<S>,
) -> Result<Resolution> {
  let Some(company_slug) = params.company_slug.as_deref() else {
    return Ok(Resolution::Unchanged);
  };
  let Some((company, url_store)) =
    identity.resolve_slugs(company_slug, params.store_slug.as_deref())
  else {
    tracing::debug!(company = %company_slug, "ignoring unresolvable url scope");
    return Ok(Resolution::Unchanged);
  };

  let next = ActiveScope::new(Some(company.clone()), url_store.map(|s| s.id));
  if next.same_selection(store.scope()) {
    return Ok(Resolution::Unchanged);
  }
  store.replace(next)?;
  Ok(Resolution::Updated)
}

/// Default scope when the URL does not name an accessible company.
///
/// Candidates in order: the identity's last selection, the locally persisted
/// selection, the first company. Ids that are no longer accessible are
/// skipped, and a store hint only applies inside its own company.
fn fallback_scope(identity: &Identity, persisted: PersistedScope) -> ActiveScope {
  let hints = [
    (identity.last_company_id, identity.last_store_id),
    (persisted.active_company_id, persisted.active_store_id),
  ];

  for (company_id, store_id) in hints {
    if let Some(company) = company_id.and_then(|id| identity.company_by_id(id)) {
      return ActiveScope::new(Some(company.clone()), store_id);
    }
  }

  ActiveScope::new(identity.companies.first().cloned(), identity.last_store_id)
}
