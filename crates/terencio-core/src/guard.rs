//! Scoped view guard.
//!
//! A view declares what scope it needs; the guard either lets it render or
//! substitutes a placeholder. The decision is recomputed from the identity
//! and the store on every call and nothing is cached between calls.

use crate::{identity::IdentityState, scope::ActiveScope};

/// What a guarded view needs before it may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRequirement {
  pub requires_company: bool,
  pub requires_store:   bool,
}

impl Default for ScopeRequirement {
  fn default() -> Self { Self::company() }
}

impl ScopeRequirement {
  pub const fn company() -> Self { Self { requires_company: true, requires_store: false } }

  pub const fn store() -> Self { Self { requires_company: true, requires_store: true } }

  pub const fn none() -> Self { Self { requires_company: false, requires_store: false } }
}

/// The guard's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
  /// The identity is still loading or absent.
  Pending,
  NoCompany,
  /// A store is required. Carries the active company's name, if any.
  NoStore { company_name: Option<String> },
  Unblocked,
}

impl GuardState {
  pub fn evaluate(
    identity: &IdentityState,
    scope: &ActiveScope,
    requirement: ScopeRequirement,
  ) -> Self {
    if !identity.is_authenticated() {
      return Self::Pending;
    }

    let company = scope.active_company();
    if requirement.requires_company && company.is_none() {
      return Self::NoCompany;
    }

    if requirement.requires_store && scope.active_store().is_none() {
      return Self::NoStore { company_name: company.map(|c| c.name.clone()) };
    }

    Self::Unblocked
  }

  /// Placeholder to show instead of the view, or `None` when unblocked.
  pub fn placeholder(&self) -> Option<Placeholder> {
    match self {
      Self::Pending => Some(Placeholder {
        title:   "Verifying Session...".into(),
        message: "Waiting for your account details.".into(),
        hint:    None,
      }),
      Self::NoCompany => Some(Placeholder {
        title:   "No Company Selected".into(),
        message: "Please select a company from the sidebar to continue.".into(),
        hint:    None,
      }),
      Self::NoStore { company_name } => Some(Placeholder {
        title:   "Store Required".into(),
        message: match company_name {
          Some(name) => format!(
            "This module requires a specific store to be selected. Currently viewing: {name}"
          ),
          None => "This module requires a specific store to be selected.".into(),
        },
        hint:    Some("Please select a store from the Property Selector in the sidebar.".into()),
      }),
      Self::Unblocked => None,
    }
  }
}

/// Blocking prompt rendered in place of a guarded view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
  pub title:   String,
  pub message: String,
  pub hint:    Option<String>,
}

/// Result of rendering through a [`ScopedView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
  Placeholder(Placeholder),
  Content(T),
}

impl<T> Guarded<T> {
  pub fn content(self) -> Option<T> {
    match self {
      Self::Content(t) => Some(t),
      Self::Placeholder(_) => None,
    }
  }

  pub fn is_blocked(&self) -> bool { matches!(self, Self::Placeholder(_)) }
}

/// A guard bound to the current identity and scope.
#[derive(Debug, Clone, Copy)]
pub struct ScopedView<'a> {
  identity:    &'a IdentityState,
  scope:       &'a ActiveScope,
  requirement: ScopeRequirement,
}

impl<'a> ScopedView<'a> {
  pub fn new(
    identity: &'a IdentityState,
    scope: &'a ActiveScope,
    requirement: ScopeRequirement,
  ) -> Self {
    Self { identity, scope, requirement }
  }

  pub fn state(&self) -> GuardState {
    GuardState::evaluate(self.identity, self.scope, self.requirement)
  }

  /// Render `children` if the requirement holds. When blocked, `children` is
  /// never called.
  pub fn render<T>(&self, children: impl FnOnce() -> T) -> Guarded<T> {
    match self.state().placeholder() {
      Some(placeholder) => Guarded::Placeholder(placeholder),
      None => Guarded::Content(children()),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, sync::Arc};

  use super::*;
  use crate::{
    identity::fixtures::{company, identity},
    persist::MemoryStorage,
    store::ScopeStore,
  };

  fn ready() -> IdentityState { IdentityState::Ready(Arc::new(identity(vec![]))) }

  #[test]
  fn loading_identity_is_pending() {
    let scope = ActiveScope::empty();
    let state = GuardState::evaluate(&IdentityState::Loading, &scope, ScopeRequirement::none());
    assert_eq!(state, GuardState::Pending);
    let state = GuardState::evaluate(&IdentityState::Anonymous, &scope, ScopeRequirement::company());
    assert_eq!(state, GuardState::Pending);
  }

  #[test]
  fn company_requirement_blocks_until_company_selected() {
    let acme = company("acme", &[]);
    let identity = ready();
    let mut store = ScopeStore::new(MemoryStorage::new());
    let mounted = Cell::new(0);

    let scope = store.active_scope();
    let view = ScopedView::new(&identity, &scope, ScopeRequirement::company());
    let out = view.render(|| mounted.set(mounted.get() + 1));
    match out {
      Guarded::Placeholder(p) => assert_eq!(p.title, "No Company Selected"),
      Guarded::Content(()) => panic!("children rendered without a company"),
    }
    assert_eq!(mounted.get(), 0);

    store.set_active_company(Some(acme)).unwrap();
    let scope = store.active_scope();
    let view = ScopedView::new(&identity, &scope, ScopeRequirement::company());
    assert_eq!(view.render(|| "children"), Guarded::Content("children"));
  }

  #[test]
  fn store_requirement_names_active_company() {
    let acme = company("acme", &["downtown"]);
    let identity = ready();
    let mut store = ScopeStore::new(MemoryStorage::new());
    store.set_active_company(Some(acme.clone())).unwrap();

    let scope = store.active_scope();
    let view = ScopedView::new(&identity, &scope, ScopeRequirement::store());
    assert_eq!(view.state(), GuardState::NoStore { company_name: Some("Company acme".into()) });
    let Guarded::Placeholder(p) = view.render(|| ()) else {
      panic!("expected placeholder");
    };
    assert_eq!(p.title, "Store Required");
    assert!(p.message.contains("Currently viewing: Company acme"));

    store.set_active_store(Some(&acme.stores[0])).unwrap();
    let scope = store.active_scope();
    let view = ScopedView::new(&identity, &scope, ScopeRequirement::store());
    assert_eq!(view.render(|| 42).content(), Some(42));
  }

  #[test]
  fn store_requirement_without_company_asks_for_company() {
    let identity = ready();
    let scope = ActiveScope::empty();
    let state = GuardState::evaluate(&identity, &scope, ScopeRequirement::store());
    assert_eq!(state, GuardState::NoCompany);
  }

  #[test]
  fn store_only_requirement_without_company_asks_for_store() {
    let identity = ready();
    let scope = ActiveScope::empty();
    let requirement = ScopeRequirement { requires_company: false, requires_store: true };
    let state = GuardState::evaluate(&identity, &scope, requirement);
    assert_eq!(state, GuardState::NoStore { company_name: None });

    let p = state.placeholder().unwrap();
    assert_eq!(p.title, "Store Required");
    assert!(!p.message.contains("Currently viewing"));
  }

  #[test]
  fn no_requirement_renders_without_scope() {
    let identity = ready();
    let scope = ActiveScope::empty();
    let view = ScopedView::new(&identity, &scope, ScopeRequirement::none());
    assert!(!view.render(|| ()).is_blocked());
  }

  #[test]
  fn default_requires_company_only() {
    assert_eq!(ScopeRequirement::default(), ScopeRequirement::company());
  }
}
