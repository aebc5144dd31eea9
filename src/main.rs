mod api;
mod app;
mod cache;
mod config;
mod event;
mod logging;
mod mutation;
mod query;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "postui")]
#[command(about = "A terminal UI for managing posts on a JSON REST backend")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/postui/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Backend base url, overrides config and POSTUI_BASE_URL
  #[arg(short, long)]
  base_url: Option<String>,

  /// Log file path (default: $XDG_STATE_HOME/postui/postui.log)
  #[arg(long)]
  log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration, command line wins
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(base_url) = args.base_url {
    config = config.with_base_url(base_url);
  }
  if let Some(log_file) = args.log_file {
    config = config.with_log_file(log_file);
  }

  let _log_guard = logging::init(&config.log)?;

  let client = api::PostsClient::new(&config.api)?;
  let api = api::CachedPostsClient::new(client, cache::CacheStore::new());

  // Initialize and run the app
  let mut app = app::App::new(api, Duration::from_millis(config.ui.tick_rate_ms));
  app.run().await?;

  Ok(())
}
