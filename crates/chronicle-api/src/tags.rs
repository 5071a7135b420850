//! Handlers for `/tags` and `/events/tags/:tag`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chronicle_core::{
  catalog::Catalog,
  event::Event,
  query::{EventFilter, PageRequest, Pagination},
  store::EventStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{Paginated, error::ApiError, events::LangParam};

/// `GET /tags[?lang=..]` — every tag in use with its occurrence count,
/// case-folded and sorted alphabetically.
pub async fn list<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<LangParam>,
) -> Result<Json<serde_json::Value>, ApiError> {
  let store = catalog.store_for_code(params.lang.as_deref());
  let tags = store.list_tags().await?;
  Ok(Json(json!({ "data": tags })))
}

#[derive(Debug, Deserialize, Default)]
pub struct ByTagParams {
  pub lang:  Option<String>,
  pub page:  Option<String>,
  pub limit: Option<String>,
}

/// `GET /events/tags/:tag[?lang=..][&page=..][&limit=..]`
///
/// Membership is the documented quoted-substring match against the raw
/// stored JSON text, case-insensitive.
pub async fn events_by_tag<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(tag): Path<String>,
  Query(params): Query<ByTagParams>,
) -> Result<Json<Paginated<Event>>, ApiError> {
  if tag.trim().is_empty() {
    return Err(ApiError::BadRequest("tag parameter is required".into()));
  }

  let store = catalog.store_for_code(params.lang.as_deref());
  let filter = EventFilter::with_tag(tag);
  let page = PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref());

  let total = store.count_events(&filter).await?;
  let events = store
    .list_events(&filter, page.per_page, page.offset())
    .await?;

  Ok(Json(Paginated { events, pagination: Pagination::new(page, total) }))
}
