//! [`ScopeSession`]: one constructed instance per running console, wiring
//! the identity, the scope store, the resolver and the router together.
//!
//! Every external event (identity loaded, navigation, explicit selection,
//! logout) enters through a method here and triggers at most one
//! reconciliation pass.

use std::sync::Arc;

use crate::{
  Result,
  guard::{ScopeRequirement, ScopedView},
  identity::{CompanyId, Identity, IdentityState, StoreId},
  persist::ScopeStorage,
  resolver::{Resolution, ScopeResolver},
  route::{
    LOGIN_PATH, MemoryRouter, NavigationMode, ROOT_PATH, Route, Router, company_path, store_path,
  },
  scope::{ActiveContext, ActiveScope},
  store::{ScopeStore, StoreChange},
};

pub struct ScopeSession<S, R> {
  identity: IdentityState,
  store:    ScopeStore<S>,
  resolver: ScopeResolver,
  router:   R,
}

impl<S: ScopeStorage, R: Router> ScopeSession<S, R> {
  /// Build a session and hydrate `store` from its storage.
  pub fn new(mut store: ScopeStore<S>, router: R) -> Self {
    store.hydrate();
    Self {
      identity: IdentityState::Loading,
      store,
      resolver: ScopeResolver::new(),
      router,
    }
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  pub fn identity(&self) -> &IdentityState { &self.identity }

  pub fn store(&self) -> &ScopeStore<S> { &self.store }

  pub fn router(&self) -> &R { &self.router }

  pub fn route(&self) -> Route { self.router.route() }

  pub fn active_scope(&self) -> ActiveScope { self.store.active_scope() }

  pub fn active_context(&self) -> ActiveContext { self.store.scope().context() }

  /// Guard for the view mounted at the current route.
  pub fn guard(&self) -> ScopedView<'_> { self.guard_for(self.route().requirement()) }

  pub fn guard_for(&self, requirement: ScopeRequirement) -> ScopedView<'_> {
    ScopedView::new(&self.identity, self.store.scope(), requirement)
  }

  // ── Identity events ─────────────────────────────────────────────────────

  /// A (new) identity arrived from the provider. Resolution starts over from
  /// the new company tree; only the persisted record carries over, as a hint.
  pub fn identity_loaded(&mut self, identity: Identity) -> Result<Resolution> {
    tracing::info!(
      user = %identity.username,
      companies = identity.companies.len(),
      "identity loaded"
    );
    self.identity = IdentityState::Ready(Arc::new(identity));
    self.store.forget();
    self.resolver.reset();
    self.reconcile()
  }

  /// The identity fetch failed or the session is not authenticated. The
  /// persisted scope is kept for the next login.
  pub fn identity_failed(&mut self) -> Result<Resolution> {
    self.identity = IdentityState::Anonymous;
    self.store.forget();
    self.resolver.reset();
    self.reconcile()
  }

  /// Discard the identity and the scope, and return to the login page.
  pub fn logout(&mut self) -> Result<()> {
    self.identity = IdentityState::Anonymous;
    self.store.clear()?;
    self.resolver.reset();
    self.router.navigate(LOGIN_PATH, NavigationMode::Replace);
    tracing::info!("logged out");
    Ok(())
  }

  // ── Navigation ──────────────────────────────────────────────────────────

  /// Follow a link to `path`.
  pub fn navigate(&mut self, path: &str) -> Result<Resolution> {
    self.router.navigate(path, NavigationMode::Push);
    self.reconcile()
  }

  /// Explicitly select a company: clears the store and goes to the
  /// company's base path. Ids outside the identity tree are ignored.
  pub fn switch_company(&mut self, id: CompanyId) -> Result<bool> {
    let Some(company) = self.identity.identity().and_then(|i| i.company_by_id(id)).cloned()
    else {
      tracing::warn!(company = %id, "ignoring switch to inaccessible company");
      return Ok(false);
    };

    self.store.set_active_company(Some(company.clone()))?;
    self.router.navigate(&company_path(&company), NavigationMode::Push);
    self.reconcile()?;
    Ok(true)
  }

  /// Explicitly select a store in the active company, or clear the store
  /// with `None`.
  pub fn switch_store(&mut self, id: Option<StoreId>) -> Result<bool> {
    let Some(company) = self.store.scope().active_company().cloned() else {
      tracing::warn!("ignoring store switch without an active company");
      return Ok(false);
    };

    let identity = self.identity.identity().cloned();
    let store = match id {
      None => None,
      Some(id) => {
        let found = identity
          .as_deref()
          .and_then(|i| i.companies.iter().find_map(|c| c.store_by_id(id)));
        match found {
          Some(store) => Some(store),
          None => {
            tracing::warn!(store = %id, "ignoring switch to inaccessible store");
            return Ok(false);
          }
        }
      }
    };

    if self.store.set_active_store(store)? == StoreChange::Rejected {
      return Ok(false);
    }

    let path = match store {
      Some(store) => store_path(&company, store),
      None => company_path(&company),
    };
    self.router.navigate(&path, NavigationMode::Push);
    self.reconcile()?;
    Ok(true)
  }

  /// Reconcile the current location with the store.
  ///
  /// Unknown paths go to `/`; anonymous visitors go to the login page; a
  /// ready identity on `/` or `/login` is sent to its active scope.
  pub fn reconcile(&mut self) -> Result<Resolution> {
    let mut route = self.router.route();
    if route == Route::NotFound {
      tracing::debug!(path = %self.router.location(), "unknown route");
      self.router.navigate(ROOT_PATH, NavigationMode::Replace);
      route = Route::Root;
    }

    match &self.identity {
      IdentityState::Loading => return Ok(Resolution::Deferred),
      IdentityState::Anonymous => {
        if route != Route::Login {
          self.router.navigate(LOGIN_PATH, NavigationMode::Replace);
        }
        return Ok(Resolution::Deferred);
      }
      IdentityState::Ready(_) => {}
    }

    let resolution = self.resolver.resolve(&self.identity, &route.params(), &mut self.store)?;
    match &resolution {
      Resolution::Redirect(redirect) => self.router.navigate(&redirect.path, redirect.mode),
      _ if matches!(route, Route::Root | Route::Login) => {
        if let Some(path) = self.store.scope().path() {
          self.router.navigate(&path, NavigationMode::Replace);
        }
      }
      _ => {}
    }
    Ok(resolution)
  }

  pub fn into_parts(self) -> (ScopeStore<S>, R) { (self.store, self.router) }
}

impl<S: ScopeStorage> ScopeSession<S, MemoryRouter> {
  /// History back, then reconcile. Returns `false` at the start of history.
  pub fn back(&mut self) -> Result<bool> {
    if !self.router.back() {
      return Ok(false);
    }
    self.reconcile()?;
    Ok(true)
  }

  /// History forward, then reconcile.
  pub fn forward(&mut self) -> Result<bool> {
    if !self.router.forward() {
      return Ok(false);
    }
    self.reconcile()?;
    Ok(true)
  }
}
