//! Application state machine and event dispatcher.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use terencio_core::{
  identity::{CompanyId, StoreId},
  route::{CompanyModule, MemoryRouter, Route, StoreModule},
  session::ScopeSession,
};
use terencio_store_sqlite::SqliteScopeStorage;

use crate::client::{ApiClient, ClientError};

pub type Session = ScopeSession<SqliteScopeStorage, MemoryRouter>;

// ─── Modes ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
  Company,
  Store,
}

/// A fuzzy-filtered company or store list shown as a popup.
#[derive(Debug, Clone)]
pub struct Picker {
  pub kind:   PickerKind,
  pub filter: String,
  pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerTarget {
  Company(CompanyId),
  Store(StoreId),
}

#[derive(Debug, Clone)]
pub struct PickerEntry {
  pub label:  String,
  pub slug:   String,
  pub active: bool,
  pub target: PickerTarget,
}

/// Single-line text input.
#[derive(Debug, Clone)]
pub enum Prompt {
  GoTo(String),
  Username(String),
  Password { username: String, input: String },
}

impl Prompt {
  pub fn label(&self) -> &'static str {
    match self {
      Self::GoTo(_) => "Go to",
      Self::Username(_) => "Username",
      Self::Password { .. } => "Password",
    }
  }

  /// Text to display; passwords are masked.
  pub fn display(&self) -> String {
    match self {
      Self::GoTo(s) | Self::Username(s) => s.clone(),
      Self::Password { input, .. } => "*".repeat(input.chars().count()),
    }
  }

  fn input_mut(&mut self) -> &mut String {
    match self {
      Self::GoTo(s) | Self::Username(s) => s,
      Self::Password { input, .. } => input,
    }
  }
}

#[derive(Debug, Clone)]
pub enum Mode {
  Normal,
  Picker(Picker),
  Prompt(Prompt),
}

/// One module link in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
  pub label: &'static str,
  pub path:  String,
}

/// Credentials from the config layers, used for automatic sign-in.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
  pub username: Option<String>,
  pub password: Option<String>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub session:        Session,
  pub client:         ApiClient,
  credentials:        Credentials,
  pub mode:           Mode,
  /// Cursor position within [`App::sidebar`].
  pub sidebar_cursor: usize,
  /// One-line status message shown in the status bar.
  pub status_msg:     String,
}

impl App {
  pub fn new(session: Session, client: ApiClient, credentials: Credentials) -> Self {
    Self {
      session,
      client,
      credentials,
      mode: Mode::Normal,
      sidebar_cursor: 0,
      status_msg: String::new(),
    }
  }

  // ── Identity ──────────────────────────────────────────────────────────────

  /// Sign in with the configured credentials, or fall back to the login page
  /// when there are none.
  pub async fn sign_in(&mut self) -> anyhow::Result<()> {
    match (self.credentials.username.clone(), self.credentials.password.clone()) {
      (Some(username), Some(password)) => self.sign_in_with(&username, &password).await,
      _ => {
        self.session.identity_failed()?;
        self.status_msg = "Press Enter to sign in.".into();
        Ok(())
      }
    }
  }

  async fn sign_in_with(&mut self, username: &str, password: &str) -> anyhow::Result<()> {
    self.status_msg = "Signing in…".into();
    match self.client.login(username, password).await {
      Ok(_) => self.load_identity().await,
      Err(ClientError::Unauthorized) => {
        self.session.identity_failed()?;
        self.status_msg = "Invalid username or password.".into();
        Ok(())
      }
      Err(e) => {
        tracing::warn!(error = %e, "login failed");
        self.status_msg = format!("Error: {e}  (r to retry)");
        Ok(())
      }
    }
  }

  /// Fetch the identity and hand it to the session. Transport failures leave
  /// the identity loading so guarded views keep showing their pending state.
  pub async fn load_identity(&mut self) -> anyhow::Result<()> {
    match self.client.current_identity().await {
      Ok(identity) => {
        self.session.identity_loaded(identity)?;
        self.sidebar_cursor = 0;
        self.status_msg.clear();
      }
      Err(ClientError::Unauthorized) => {
        self.session.identity_failed()?;
        self.status_msg = "Session expired. Press Enter to sign in.".into();
      }
      Err(e) => {
        tracing::warn!(error = %e, "identity fetch failed");
        self.status_msg = format!("Error: {e}  (r to retry)");
      }
    }
    Ok(())
  }

  async fn retry(&mut self) -> anyhow::Result<()> {
    if self.client.is_logged_in() {
      self.load_identity().await
    } else {
      self.sign_in().await
    }
  }

  async fn logout(&mut self) -> anyhow::Result<()> {
    self.client.logout().await;
    self.session.logout()?;
    self.mode = Mode::Normal;
    self.sidebar_cursor = 0;
    self.status_msg = "Signed out.".into();
    Ok(())
  }

  // ── Derived views ─────────────────────────────────────────────────────────

  /// Module links for the current scope: store modules when a store is
  /// active, company modules otherwise, nothing without a company.
  pub fn sidebar(&self) -> Vec<SidebarEntry> {
    let scope = self.session.store().scope();
    let Some(company) = scope.active_company() else {
      return Vec::new();
    };

    match scope.active_store() {
      Some(store) => StoreModule::ALL
        .into_iter()
        .map(|module| SidebarEntry {
          label: module.label(),
          path:  Route::Store {
            company_slug: company.slug.clone(),
            store_slug: store.slug.clone(),
            module,
          }
          .to_string(),
        })
        .collect(),
      None => CompanyModule::ALL
        .into_iter()
        .map(|module| SidebarEntry {
          label: module.label(),
          path:  Route::Company { company_slug: company.slug.clone(), module }.to_string(),
        })
        .collect(),
    }
  }

  /// Entries of `picker` that match its filter.
  pub fn picker_entries(&self, picker: &Picker) -> Vec<PickerEntry> {
    let Some(identity) = self.session.identity().identity() else {
      return Vec::new();
    };
    let scope = self.session.store().scope();

    let all: Vec<PickerEntry> = match picker.kind {
      PickerKind::Company => identity
        .companies
        .iter()
        .map(|c| PickerEntry {
          label:  c.name.clone(),
          slug:   c.slug.clone(),
          active: scope.company_id() == Some(c.id),
          target: PickerTarget::Company(c.id),
        })
        .collect(),
      PickerKind::Store => scope
        .active_company()
        .map(|c| {
          c.stores
            .iter()
            .map(|s| PickerEntry {
              label:  s.name.clone(),
              slug:   s.slug.clone(),
              active: scope.store_id() == Some(s.id),
              target: PickerTarget::Store(s.id),
            })
            .collect()
        })
        .unwrap_or_default(),
    };

    if picker.filter.is_empty() {
      return all;
    }
    let matcher = SkimMatcherV2::default();
    all
      .into_iter()
      .filter(|e| {
        matcher.fuzzy_match(&e.label, &picker.filter).is_some()
          || matcher.fuzzy_match(&e.slug, &picker.filter).is_some()
      })
      .collect()
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match std::mem::replace(&mut self.mode, Mode::Normal) {
      Mode::Normal => self.handle_normal_key(key).await,
      Mode::Picker(picker) => {
        self.handle_picker_key(picker, key)?;
        Ok(true)
      }
      Mode::Prompt(prompt) => {
        self.handle_prompt_key(prompt, key).await?;
        Ok(true)
      }
    }
  }

  async fn handle_normal_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let authenticated = self.session.identity().is_authenticated();

    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Char('r') => self.retry().await?,

      // History
      KeyCode::Char('[') => {
        self.session.back()?;
      }
      KeyCode::Char(']') => {
        self.session.forward()?;
      }

      KeyCode::Char('g') => self.mode = Mode::Prompt(Prompt::GoTo("/".into())),

      KeyCode::Enter if !authenticated => {
        if self.credentials.username.is_some() && self.credentials.password.is_some() {
          self.sign_in().await?;
        } else {
          self.mode = Mode::Prompt(Prompt::Username(String::new()));
        }
      }

      _ if !authenticated => {}

      // Scope selection
      KeyCode::Char('c') => self.open_picker(PickerKind::Company),
      KeyCode::Char('s') => {
        if self.session.store().scope().is_empty() {
          self.status_msg = "Select a company first.".into();
        } else {
          self.open_picker(PickerKind::Store);
        }
      }
      KeyCode::Char('x') => {
        if self.session.switch_store(None)? {
          self.status_msg = "Store cleared.".into();
        }
      }

      // Sidebar
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.sidebar().len();
        if self.sidebar_cursor + 1 < len {
          self.sidebar_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
      }
      KeyCode::Enter => {
        if let Some(entry) = self.sidebar().get(self.sidebar_cursor) {
          self.session.navigate(&entry.path)?;
        }
      }

      KeyCode::Char('L') => self.logout().await?,

      _ => {}
    }
    Ok(true)
  }

  fn open_picker(&mut self, kind: PickerKind) {
    self.mode = Mode::Picker(Picker { kind, filter: String::new(), cursor: 0 });
  }

  fn handle_picker_key(&mut self, mut picker: Picker, key: KeyEvent) -> anyhow::Result<()> {
    match key.code {
      KeyCode::Esc => return Ok(()),
      KeyCode::Enter => {
        let entries = self.picker_entries(&picker);
        if let Some(entry) = entries.get(picker.cursor) {
          self.select(entry.target, &entry.label)?;
        }
        return Ok(());
      }
      KeyCode::Down => {
        if picker.cursor + 1 < self.picker_entries(&picker).len() {
          picker.cursor += 1;
        }
      }
      KeyCode::Up => picker.cursor = picker.cursor.saturating_sub(1),
      KeyCode::Backspace => {
        picker.filter.pop();
        picker.cursor = 0;
      }
      KeyCode::Char(c) => {
        picker.filter.push(c);
        picker.cursor = 0;
      }
      _ => {}
    }
    self.mode = Mode::Picker(picker);
    Ok(())
  }

  fn select(&mut self, target: PickerTarget, label: &str) -> anyhow::Result<()> {
    let changed = match target {
      PickerTarget::Company(id) => self.session.switch_company(id)?,
      PickerTarget::Store(id) => self.session.switch_store(Some(id))?,
    };
    if changed {
      self.sidebar_cursor = 0;
      self.status_msg = format!("Switched to {label}.");
    }
    Ok(())
  }

  async fn handle_prompt_key(&mut self, mut prompt: Prompt, key: KeyEvent) -> anyhow::Result<()> {
    match key.code {
      KeyCode::Esc => return Ok(()),
      KeyCode::Enter => return self.submit_prompt(prompt).await,
      KeyCode::Backspace => {
        prompt.input_mut().pop();
      }
      KeyCode::Char(c) => prompt.input_mut().push(c),
      _ => {}
    }
    self.mode = Mode::Prompt(prompt);
    Ok(())
  }

  async fn submit_prompt(&mut self, prompt: Prompt) -> anyhow::Result<()> {
    match prompt {
      Prompt::GoTo(path) => {
        let path = if path.starts_with('/') { path } else { format!("/{path}") };
        self.session.navigate(&path)?;
        self.sidebar_cursor = 0;
      }
      Prompt::Username(username) => {
        self.mode = Mode::Prompt(Prompt::Password { username, input: String::new() });
      }
      Prompt::Password { username, input } => self.sign_in_with(&username, &input).await?,
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use terencio_core::{
    identity::{Company, Identity, Store},
    route::Router as _,
    store::ScopeStore,
  };
  use uuid::Uuid;

  use super::*;

  fn company(slug: &str, name: &str, stores: &[(&str, &str)]) -> Arc<Company> {
    Arc::new(Company {
      id:     CompanyId(Uuid::new_v4()),
      name:   name.into(),
      slug:   slug.into(),
      stores: stores
        .iter()
        .map(|(slug, name)| Store {
          id:   StoreId(Uuid::new_v4()),
          name: (*name).into(),
          slug: (*slug).into(),
        })
        .collect(),
    })
  }

  fn app(path: &str) -> App {
    let storage = SqliteScopeStorage::open_in_memory().unwrap();
    let session = ScopeSession::new(ScopeStore::new(storage), MemoryRouter::new(path));
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let mut app = App::new(session, client, Credentials::default());
    app
      .session
      .identity_loaded(Identity {
        id:              1,
        username:        "alice".into(),
        full_name:       "Alice Doe".into(),
        is_active:       true,
        companies:       vec![
          company("acme", "Acme Retail", &[("downtown", "Downtown"), ("uptown", "Uptown")]),
          company("globex", "Globex Foods", &[("harbor", "Harbor")]),
        ],
        last_company_id: None,
        last_store_id:   None,
      })
      .unwrap();
    app
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn press(app: &mut App, codes: &[KeyCode]) {
    for code in codes {
      assert!(app.handle_key(key(*code)).await.unwrap());
    }
  }

  async fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c))).await.unwrap();
    }
  }

  fn location(app: &App) -> &str { app.session.router().location() }

  #[tokio::test]
  async fn starts_on_first_company() {
    let app = app("/");
    assert_eq!(location(&app), "/acme");
    assert_eq!(app.sidebar().len(), CompanyModule::ALL.len());
    assert_eq!(app.sidebar()[1].path, "/acme/marketing");
  }

  #[tokio::test]
  async fn company_picker_filters_and_switches() {
    let mut app = app("/");
    press(&mut app, &[KeyCode::Char('c')]).await;
    type_str(&mut app, "glob").await;

    let Mode::Picker(picker) = &app.mode else { panic!("picker should be open") };
    let entries = app.picker_entries(picker);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].slug, "globex");

    press(&mut app, &[KeyCode::Enter]).await;
    assert!(matches!(app.mode, Mode::Normal));
    assert_eq!(location(&app), "/globex");
    assert_eq!(app.session.active_context().company_name.as_deref(), Some("Globex Foods"));
  }

  #[tokio::test]
  async fn store_picker_then_clear() {
    let mut app = app("/acme");
    press(&mut app, &[KeyCode::Char('s'), KeyCode::Down, KeyCode::Enter]).await;
    assert_eq!(location(&app), "/acme/uptown");
    assert_eq!(app.sidebar()[1].path, "/acme/uptown/pos");

    press(&mut app, &[KeyCode::Char('x')]).await;
    assert_eq!(location(&app), "/acme");
    assert!(app.session.active_scope().active_store().is_none());
  }

  #[tokio::test]
  async fn escape_closes_picker_without_change() {
    let mut app = app("/acme");
    press(&mut app, &[KeyCode::Char('c'), KeyCode::Down, KeyCode::Esc]).await;
    assert!(matches!(app.mode, Mode::Normal));
    assert_eq!(location(&app), "/acme");
  }

  #[tokio::test]
  async fn sidebar_enter_opens_module() {
    let mut app = app("/acme");
    press(&mut app, &[KeyCode::Char('j'), KeyCode::Char('j'), KeyCode::Enter]).await;
    assert_eq!(location(&app), "/acme/inventory");
    assert_eq!(app.session.route().title(), "Company Inventory");
  }

  #[tokio::test]
  async fn goto_prompt_follows_deep_link() {
    let mut app = app("/acme");
    press(&mut app, &[KeyCode::Char('g')]).await;
    type_str(&mut app, "globex/harbor/pos").await;
    press(&mut app, &[KeyCode::Enter]).await;

    assert_eq!(location(&app), "/globex/harbor/pos");
    assert_eq!(app.session.active_context().store_slug.as_deref(), Some("harbor"));
    assert!(!app.session.guard().render(|| ()).is_blocked());
  }

  #[tokio::test]
  async fn history_keys_move_through_scopes() {
    let mut app = app("/acme");
    press(&mut app, &[KeyCode::Char('c'), KeyCode::Down, KeyCode::Enter]).await;
    assert_eq!(location(&app), "/globex");

    press(&mut app, &[KeyCode::Char('[')]).await;
    assert_eq!(location(&app), "/acme");
    assert_eq!(app.session.active_context().company_slug.as_deref(), Some("acme"));

    press(&mut app, &[KeyCode::Char(']')]).await;
    assert_eq!(app.session.active_context().company_slug.as_deref(), Some("globex"));
  }

  #[tokio::test]
  async fn logout_returns_to_login() {
    let mut app = app("/acme");
    press(&mut app, &[KeyCode::Char('L')]).await;
    assert_eq!(location(&app), "/login");
    assert!(app.session.active_scope().is_empty());
    assert!(app.sidebar().is_empty());

    // Scope keys are inert while signed out.
    press(&mut app, &[KeyCode::Char('c')]).await;
    assert!(matches!(app.mode, Mode::Normal));

    // Enter without configured credentials asks for them.
    press(&mut app, &[KeyCode::Enter]).await;
    assert!(matches!(app.mode, Mode::Prompt(Prompt::Username(_))));
  }

  #[test]
  fn password_prompt_is_masked() {
    let prompt = Prompt::Password { username: "alice".into(), input: "hunter2".into() };
    assert_eq!(prompt.display(), "*******");
    assert_eq!(prompt.label(), "Password");
  }

  #[tokio::test]
  async fn q_quits() {
    let mut app = app("/");
    assert!(!app.handle_key(key(KeyCode::Char('q'))).await.unwrap());
  }
}
