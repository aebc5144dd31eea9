use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install the global tracing subscriber.
///
/// The terminal belongs to the UI, so logs go to a file. Keep the returned
/// guard alive until exit or buffered lines are lost.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let path = match &config.file {
    Some(path) => path.clone(),
    None => default_path()?,
  };

  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."));
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Log file path has no file name: {}", path.display()))?;

  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

/// Get the default log file path
fn default_path() -> Result<PathBuf> {
  let state_dir = dirs::state_dir()
    .or_else(dirs::data_dir)
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/state")))
    .ok_or_else(|| eyre!("Could not determine log directory"))?;

  Ok(state_dir.join("postui").join("postui.log"))
}
