//! chronicle-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layered with
//! `CHRONICLE_*` environment variables, opens the two language-variant
//! stores, and serves the events API over HTTP. A store that fails to open
//! is fatal: the process does not start.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chronicle_core::catalog::Catalog;
use chronicle_server::{ServerConfig, auth::ApiKeys, router};
use chronicle_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Chronicle historical events API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CHRONICLE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let keys = ApiKeys::parse(&server_cfg.api_keys)
    .context("no valid API keys configured (api_keys / CHRONICLE_API_KEYS)")?;
  tracing::info!(count = keys.len(), "loaded API keys");

  let english = open_store(&server_cfg.db_path_en).await?;
  tracing::info!(path = %server_cfg.db_path_en.display(), "English store opened");

  let russian = open_store(&server_cfg.db_path_ru).await?;
  tracing::info!(path = %server_cfg.db_path_ru.display(), "Russian store opened");

  let catalog = Arc::new(Catalog::new(english, russian));
  let app = router(catalog, Arc::new(keys));

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Open one variant store, creating its parent directory first.
async fn open_store(path: &std::path::Path) -> anyhow::Result<SqliteStore> {
  if let Some(dir) = path.parent() {
    if !dir.as_os_str().is_empty() {
      std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    }
  }
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {}", path.display()))
}
