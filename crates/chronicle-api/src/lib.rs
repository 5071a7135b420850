//! JSON REST API for the Chronicle event catalog.
//!
//! Exposes an axum [`Router`] backed by a [`Catalog`] of any
//! [`chronicle_core::store::EventStore`]. Auth, rate limiting, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! Every route takes a `lang` query parameter selecting the language variant
//! (`ru` → Russian, anything else → English).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", chronicle_api::api_router(catalog.clone()))
//! ```

pub mod error;
pub mod events;
pub mod search;
pub mod tags;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chronicle_core::{catalog::Catalog, query::Pagination, store::EventStore};
use serde::Serialize;

pub use error::ApiError;

/// A page of results plus its pagination metadata, used as the body of every
/// list endpoint.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
  pub events:     Vec<T>,
  pub pagination: Pagination,
}

/// Build a fully-materialised API router for `catalog`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(catalog: Arc<Catalog<S>>) -> Router<()>
where
  S: EventStore + Send + Sync + 'static,
{
  Router::new()
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route("/events/batch", post(events::create_batch::<S>))
    .route(
      "/events/{id}",
      get(events::get_one::<S>)
        .patch(events::update_one::<S>)
        .delete(events::delete_one::<S>),
    )
    // Tags
    .route("/tags", get(tags::list::<S>))
    .route("/events/tags/{tag}", get(tags::events_by_tag::<S>))
    // Free-text search
    .route("/search", get(search::handler::<S>))
    .with_state(catalog)
}
