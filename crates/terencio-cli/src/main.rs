//! `terencio`: terminal back-office console for RetailOS.
//!
//! # Usage
//!
//! ```
//! terencio --url http://localhost:8080 --user alice --password secret
//! terencio --config ~/.config/terencio/config.toml /acme/downtown/pos
//! ```

mod app;
mod client;
mod settings;
mod ui;

use std::{io, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::{App, Credentials};
use clap::Parser;
use client::ApiClient;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use terencio_core::{route::MemoryRouter, session::ScopeSession, store::ScopeStore};
use terencio_store_sqlite::SqliteScopeStorage;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{DEFAULT_CONFIG_PATH, Overrides, Settings};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "terencio", version, about = "Terminal back-office console for RetailOS")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
  config: PathBuf,

  /// Base URL of the identity provider (default: http://localhost:8080).
  #[arg(long, env = "TERENCIO_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "TERENCIO_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "TERENCIO_PASSWORD")]
  password: Option<String>,

  /// SQLite file holding the persisted scope.
  #[arg(long, value_name = "FILE")]
  state: Option<PathBuf>,

  /// Console path to open, e.g. `/acme/downtown/pos`.
  #[arg(default_value = "/")]
  path: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let settings = Settings::load(&args.config, Overrides {
    url:        args.url,
    username:   args.user,
    password:   args.password,
    state_path: args.state,
  })?;

  init_logging(&settings)?;
  tracing::info!(url = %settings.url, state = %settings.state_path.display(), "starting");

  let storage = SqliteScopeStorage::open(&settings.state_path)
    .with_context(|| format!("failed to open scope storage at {:?}", settings.state_path))?;
  match storage.updated_at(&settings.storage_key) {
    Ok(Some(at)) => tracing::info!(saved_at = %at, "found persisted scope"),
    Ok(None) => tracing::info!("no persisted scope"),
    Err(e) => tracing::warn!(error = %e, "failed to read persisted scope timestamp"),
  }
  let store = ScopeStore::with_key(storage, settings.storage_key.clone());
  let session = ScopeSession::new(store, MemoryRouter::new(args.path));

  let client = ApiClient::new(&settings.url).context("failed to build HTTP client")?;
  let mut app = App::new(session, client, Credentials {
    username: settings.username,
    password: settings.password,
  });

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Log to a file so output does not tear the TUI.
fn init_logging(settings: &Settings) -> Result<()> {
  if let Some(parent) = settings.log_file.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("creating log directory {}", parent.display()))?;
  }
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&settings.log_file)
    .with_context(|| format!("opening log file {}", settings.log_file.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  // First frame shows the pending state while the identity loads.
  terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;
  app.sign_in().await?;

  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == event::KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
