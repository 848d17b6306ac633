//! Runtime settings: an optional TOML file overlaid with `PANIM_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use panim_core::ImportPolicy;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite file holding the history.
  pub store_path:    PathBuf,
  /// Base URL of the generative-language API.
  pub endpoint:      String,
  pub model:         String,
  pub api_key:       String,
  pub timeout_secs:  u64,
  pub import_policy: ImportPolicy,
  /// JSON method catalog replacing the built-in one.
  pub catalog_path:  Option<PathBuf>,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path:    PathBuf::from("~/.local/share/panim/history.db"),
      endpoint:      "https://generativelanguage.googleapis.com/v1beta".to_owned(),
      model:         "gemini-2.5-flash".to_owned(),
      api_key:       String::new(),
      timeout_secs:  120,
      import_policy: ImportPolicy::default(),
      catalog_path:  None,
    }
  }
}

impl Settings {
  /// Read `file` if it exists, then apply environment overrides.
  pub fn load(file: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(expand_tilde(file)).required(false))
      .add_source(config::Environment::with_prefix("PANIM"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
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
