use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Backend used when nothing else is configured (json-server default port)
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Environment variable overriding the configured base url
pub const BASE_URL_ENV: &str = "POSTUI_BASE_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub ui: UiConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Per-request timeout
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// How often pending requests are polled and the screen redrawn
  #[serde(default = "default_tick_rate_ms")]
  pub tick_rate_ms: u64,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self {
      tick_rate_ms: default_tick_rate_ms(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
  /// Filter directive used when RUST_LOG is not set
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Log file path (default: $XDG_STATE_HOME/postui/postui.log)
  pub file: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      file: None,
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

fn default_tick_rate_ms() -> u64 {
  100
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./postui.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/postui/config.yaml
  ///
  /// Without a config file the defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_env_overrides())
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("postui.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("postui").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to null
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  fn with_env_overrides(self) -> Self {
    match std::env::var(BASE_URL_ENV) {
      Ok(url) if !url.trim().is_empty() => self.with_base_url(url),
      _ => self,
    }
  }

  /// Replace the backend base url
  pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
    Config {
      api: ApiConfig {
        base_url: base_url.into(),
        ..self.api
      },
      ..self
    }
  }

  /// Replace the log file path
  pub fn with_log_file(self, file: PathBuf) -> Self {
    Config {
      log: LogConfig {
        file: Some(file),
        ..self.log
      },
      ..self
    }
  }
}
