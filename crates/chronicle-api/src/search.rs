//! Handler for `GET /search`.
//!
//! Ranking is delegated entirely to the store's text index; pagination
//! semantics are identical to the listing endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chronicle_core::{
  catalog::Catalog,
  query::{PageRequest, Pagination, SearchHit},
  store::EventStore,
};
use serde::Deserialize;

use crate::{Paginated, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub lang:  Option<String>,
  /// The free-text query. Required; an empty value is a 400.
  pub q:     Option<String>,
  pub page:  Option<String>,
  pub limit: Option<String>,
}

/// `GET /search?q=...[&lang=..][&page=..][&limit=..]`
pub async fn handler<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Paginated<SearchHit>>, ApiError> {
  let query = params
    .q
    .as_deref()
    .map(str::trim)
    .filter(|q| !q.is_empty())
    .ok_or_else(|| ApiError::BadRequest("search query is required".into()))?;

  let store = catalog.store_for_code(params.lang.as_deref());
  let page = PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref());

  let total = store.count_search(query).await?;
  let events = store
    .search_events(query, page.per_page, page.offset())
    .await?;

  Ok(Json(Paginated { events, pagination: Pagination::new(page, total) }))
}
