//! Layered settings: built-in defaults, then the config file, then
//! `TERENCIO_*` environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Deserialize;
use terencio_core::persist::SCOPE_STORAGE_KEY;

pub const DEFAULT_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/terencio/config.toml";
const DEFAULT_STATE_PATH: &str = "~/.local/share/terencio/scope.db";
const DEFAULT_LOG_FILE: &str = "~/.local/share/terencio/terencio.log";

/// Effective settings after all layers are merged.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub url:         String,
  #[serde(default)]
  pub username:    Option<String>,
  #[serde(default)]
  pub password:    Option<String>,
  pub state_path:  PathBuf,
  pub log_file:    PathBuf,
  pub storage_key: String,
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub url:        Option<String>,
  pub username:   Option<String>,
  pub password:   Option<String>,
  pub state_path: Option<PathBuf>,
}

impl Settings {
  /// Merge every layer. A missing config file is not an error.
  pub fn load(config_path: &Path, overrides: Overrides) -> Result<Self> {
    let settings = config::Config::builder()
      .set_default("url", DEFAULT_URL)?
      .set_default("state_path", DEFAULT_STATE_PATH)?
      .set_default("log_file", DEFAULT_LOG_FILE)?
      .set_default("storage_key", SCOPE_STORAGE_KEY)?
      .add_source(config::File::from(expand_tilde(config_path)).required(false))
      .add_source(config::Environment::with_prefix("TERENCIO"))
      .set_override_option("url", overrides.url)?
      .set_override_option("username", overrides.username)?
      .set_override_option("password", overrides.password)?
      .set_override_option(
        "state_path",
        overrides.state_path.map(|p| p.to_string_lossy().into_owned()),
      )?
      .build()
      .context("failed to read configuration")?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.state_path = expand_tilde(&settings.state_path);
    settings.log_file = expand_tilde(&settings.log_file);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
