//! HTTP server assembly for the Chronicle events API.
//!
//! Mounts the `chronicle-api` router under `/api` behind API-key auth, CORS
//! and request tracing. Everything here is boundary plumbing; the catalog
//! semantics live in `chronicle-core` and the store crates.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use chronicle_core::{catalog::Catalog, store::EventStore};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use auth::ApiKeys;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `CHRONICLE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// English-variant database file.
  #[serde(default = "default_db_path_en")]
  pub db_path_en: PathBuf,
  /// Russian-variant database file.
  #[serde(default = "default_db_path_ru")]
  pub db_path_ru: PathBuf,
  /// Comma-separated list of accepted API keys. Required.
  pub api_keys:   String,
}

fn default_host() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  3000
}

fn default_db_path_en() -> PathBuf {
  PathBuf::from("./data/events.db")
}

fn default_db_path_ru() -> PathBuf {
  PathBuf::from("./data/events_ru.db")
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: the JSON API under `/api`, guarded by
/// the API-key middleware, with CORS and trace layers outermost.
pub fn router<S>(catalog: Arc<Catalog<S>>, keys: Arc<ApiKeys>) -> Router
where
  S: EventStore + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", chronicle_api::api_router(catalog))
    .layer(middleware::from_fn_with_state(keys, auth::require_api_key))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}
