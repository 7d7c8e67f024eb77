//! Console routes and the router contract.
//!
//! Routes are hierarchical: `/:company[/module]` for company-level views and
//! `/:company/:store[/module]` for store-level views. A second segment that
//! names a company module always wins over a store slug of the same name.

use std::fmt;

use crate::{
  guard::ScopeRequirement,
  identity::{Company, Store},
};

pub const LOGIN_PATH: &str = "/login";
pub const ROOT_PATH: &str = "/";

// ─── Modules ─────────────────────────────────────────────────────────────────

/// Views mounted under `/:company`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyModule {
  Home,
  Marketing,
  Inventory,
  Reports,
  Settings,
}

impl CompanyModule {
  pub const ALL: [Self; 5] =
    [Self::Home, Self::Marketing, Self::Inventory, Self::Reports, Self::Settings];

  /// Path segment, `None` for the company home page.
  pub fn segment(self) -> Option<&'static str> {
    match self {
      Self::Home => None,
      Self::Marketing => Some("marketing"),
      Self::Inventory => Some("inventory"),
      Self::Reports => Some("reports"),
      Self::Settings => Some("settings"),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Home => "Overview",
      Self::Marketing => "Marketing",
      Self::Inventory => "Company Inventory",
      Self::Reports => "Company Reports",
      Self::Settings => "Company Settings",
    }
  }

  fn from_segment(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|m| m.segment() == Some(s))
  }
}

/// Views mounted under `/:company/:store`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreModule {
  Home,
  Pos,
  Inventory,
  Reports,
  Settings,
}

impl StoreModule {
  pub const ALL: [Self; 5] =
    [Self::Home, Self::Pos, Self::Inventory, Self::Reports, Self::Settings];

  pub fn segment(self) -> Option<&'static str> {
    match self {
      Self::Home => None,
      Self::Pos => Some("pos"),
      Self::Inventory => Some("inventory"),
      Self::Reports => Some("reports"),
      Self::Settings => Some("settings"),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Home => "Store Overview",
      Self::Pos => "Point of Sale",
      Self::Inventory => "Inventory",
      Self::Reports => "Store Reports",
      Self::Settings => "Store Settings",
    }
  }

  fn from_segment(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|m| m.segment() == Some(s))
  }
}

// ─── Route ───────────────────────────────────────────────────────────────────

/// Company and store slugs carried by the current path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeParams {
  pub company_slug: Option<String>,
  pub store_slug:   Option<String>,
}

/// A parsed console path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  Root,
  Login,
  Company { company_slug: String, module: CompanyModule },
  Store { company_slug: String, store_slug: String, module: StoreModule },
  NotFound,
}

impl Route {
  /// Parse a path. Query strings, fragments and empty segments are ignored.
  pub fn parse(path: &str) -> Self {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
      [] => Self::Root,
      ["login"] => Self::Login,
      [company] => Self::Company {
        company_slug: (*company).to_owned(),
        module:       CompanyModule::Home,
      },
      [company, second] => match CompanyModule::from_segment(second) {
        Some(module) => Self::Company { company_slug: (*company).to_owned(), module },
        None => Self::Store {
          company_slug: (*company).to_owned(),
          store_slug:   (*second).to_owned(),
          module:       StoreModule::Home,
        },
      },
      [company, store, third] => match StoreModule::from_segment(third) {
        Some(module) => Self::Store {
          company_slug: (*company).to_owned(),
          store_slug: (*store).to_owned(),
          module,
        },
        None => Self::NotFound,
      },
      _ => Self::NotFound,
    }
  }

  pub fn params(&self) -> ScopeParams {
    match self {
      Self::Company { company_slug, .. } => ScopeParams {
        company_slug: Some(company_slug.clone()),
        store_slug:   None,
      },
      Self::Store { company_slug, store_slug, .. } => ScopeParams {
        company_slug: Some(company_slug.clone()),
        store_slug:   Some(store_slug.clone()),
      },
      _ => ScopeParams::default(),
    }
  }

  /// What the view mounted at this route needs before it may render.
  pub fn requirement(&self) -> ScopeRequirement {
    match self {
      Self::Company { .. } => ScopeRequirement::company(),
      Self::Store { .. } => ScopeRequirement::store(),
      _ => ScopeRequirement::none(),
    }
  }

  /// Whether the route sits behind authentication.
  pub fn is_protected(&self) -> bool { matches!(self, Self::Company { .. } | Self::Store { .. }) }

  pub fn title(&self) -> &'static str {
    match self {
      Self::Root => "Home",
      Self::Login => "Sign in",
      Self::Company { module, .. } => module.label(),
      Self::Store { module, .. } => module.label(),
      Self::NotFound => "Not found",
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Root => f.write_str(ROOT_PATH),
      Self::Login => f.write_str(LOGIN_PATH),
      Self::NotFound => f.write_str("/404"),
      Self::Company { company_slug, module } => {
        write!(f, "/{company_slug}")?;
        if let Some(seg) = module.segment() {
          write!(f, "/{seg}")?;
        }
        Ok(())
      }
      Self::Store { company_slug, store_slug, module } => {
        write!(f, "/{company_slug}/{store_slug}")?;
        if let Some(seg) = module.segment() {
          write!(f, "/{seg}")?;
        }
        Ok(())
      }
    }
  }
}

/// Base path of a company: `/{company}`.
pub fn company_path(company: &Company) -> String { format!("/{}", company.slug) }

/// Base path of a store: `/{company}/{store}`.
pub fn store_path(company: &Company, store: &Store) -> String {
  format!("/{}/{}", company.slug, store.slug)
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// How a navigation affects history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
  /// Add a history entry.
  Push,
  /// Rewrite the current entry; back-history is untouched.
  Replace,
}

/// A navigation requested by the scope engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
  pub path: String,
  pub mode: NavigationMode,
}

impl Redirect {
  pub fn push(path: impl Into<String>) -> Self {
    Self { path: path.into(), mode: NavigationMode::Push }
  }

  pub fn replace(path: impl Into<String>) -> Self {
    Self { path: path.into(), mode: NavigationMode::Replace }
  }
}

/// The host's router: reports the current location and performs navigations.
pub trait Router {
  fn location(&self) -> &str;

  fn navigate(&mut self, path: &str, mode: NavigationMode);

  fn route(&self) -> Route { Route::parse(self.location()) }
}

/// In-process router with a browser-style history stack.
#[derive(Debug, Clone)]
pub struct MemoryRouter {
  entries: Vec<String>,
  index:   usize,
}

impl MemoryRouter {
  pub fn new(initial: impl Into<String>) -> Self {
    Self { entries: vec![initial.into()], index: 0 }
  }

  /// Step back one entry. Returns `false` at the start of history.
  pub fn back(&mut self) -> bool {
    if self.index == 0 {
      return false;
    }
    self.index -= 1;
    true
  }

  /// Step forward one entry. Returns `false` at the end of history.
  pub fn forward(&mut self) -> bool {
    if self.index + 1 >= self.entries.len() {
      return false;
    }
    self.index += 1;
    true
  }

  pub fn history(&self) -> &[String] { &self.entries }
}

impl Default for MemoryRouter {
  fn default() -> Self { Self::new(ROOT_PATH) }
}

impl Router for MemoryRouter {
  fn location(&self) -> &str { &self.entries[self.index] }

  fn navigate(&mut self, path: &str, mode: NavigationMode) {
    match mode {
      NavigationMode::Push => {
        self.entries.truncate(self.index + 1);
        self.entries.push(path.to_owned());
        self.index = self.entries.len() - 1;
      }
      NavigationMode::Replace => self.entries[self.index] = path.to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_hierarchical_paths() {
    assert_eq!(Route::parse("/"), Route::Root);
    assert_eq!(Route::parse("/login"), Route::Login);
    assert_eq!(
      Route::parse("/acme"),
      Route::Company { company_slug: "acme".into(), module: CompanyModule::Home }
    );
    assert_eq!(
      Route::parse("/acme/downtown/pos"),
      Route::Store {
        company_slug: "acme".into(),
        store_slug:   "downtown".into(),
        module:       StoreModule::Pos,
      }
    );
    assert_eq!(Route::parse("/acme/downtown/nope"), Route::NotFound);
    assert_eq!(Route::parse("/a/b/c/d"), Route::NotFound);
  }

  #[test]
  fn company_module_wins_over_store_slug() {
    assert_eq!(
      Route::parse("/acme/marketing"),
      Route::Company { company_slug: "acme".into(), module: CompanyModule::Marketing }
    );
  }

  #[test]
  fn ignores_query_and_trailing_slash() {
    assert_eq!(Route::parse("/acme/downtown/?tab=2").params(), ScopeParams {
      company_slug: Some("acme".into()),
      store_slug:   Some("downtown".into()),
    });
  }

  #[test]
  fn display_round_trips_path() {
    for path in ["/", "/login", "/acme", "/acme/reports", "/acme/downtown", "/acme/downtown/settings"] {
      assert_eq!(Route::parse(path).to_string(), path);
    }
  }

  #[test]
  fn requirements_follow_route_level() {
    assert!(!Route::parse("/acme").requirement().requires_store);
    assert!(Route::parse("/acme").requirement().requires_company);
    assert!(Route::parse("/acme/downtown").requirement().requires_store);
    assert!(!Route::Login.requirement().requires_company);
  }

  #[test]
  fn replace_does_not_grow_history() {
    let mut r = MemoryRouter::new("/bad");
    r.navigate("/acme", NavigationMode::Replace);
    assert_eq!(r.history(), ["/acme"]);
    assert!(!r.back());
  }

  #[test]
  fn push_truncates_forward_entries() {
    let mut r = MemoryRouter::new("/a");
    r.navigate("/b", NavigationMode::Push);
    r.navigate("/c", NavigationMode::Push);
    assert!(r.back());
    assert_eq!(r.location(), "/b");
    r.navigate("/d", NavigationMode::Push);
    assert_eq!(r.history(), ["/a", "/b", "/d"]);
    assert!(!r.forward());
  }
}
