//! Handlers for `/events` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/events` | optional `year`, `month`, `day`, `page`, `limit` |
//! | `POST`   | `/events` | Body: [`NewEvent`]; returns 201 + stored event |
//! | `POST`   | `/events/batch` | Body: array of [`NewEvent`]; all-or-nothing |
//! | `GET`    | `/events/:id` | Single event |
//! | `PATCH`  | `/events/:id` | Body: [`EventPatch`] field mask |
//! | `DELETE` | `/events/:id` | 204 on success |
//!
//! Bad `year`/`month`/`day`/`page`/`limit` values are ignored or coerced so
//! listing stays permissive. A malformed `:id` is a 400, distinct from the
//! 404 of an unknown id.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chronicle_core::{
  catalog::Catalog,
  event::{Event, EventPatch, NewEvent},
  query::{EventFilter, PageRequest, Pagination},
  store::EventStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{Paginated, error::ApiError};

/// Parse a path id: must be a base-10 unsigned 32-bit integer.
pub(crate) fn parse_id(raw: &str) -> Result<u32, ApiError> {
  raw
    .parse::<u32>()
    .map_err(|_| ApiError::BadRequest(format!("invalid event id {raw:?}")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub lang:  Option<String>,
  /// Raw strings: invalid values degrade to defaults instead of failing
  /// deserialisation.
  pub page:  Option<String>,
  pub limit: Option<String>,
  pub year:  Option<String>,
  pub month: Option<String>,
  pub day:   Option<String>,
}

/// `GET /events[?lang=..][&year=..][&month=..][&day=..][&page=..][&limit=..]`
pub async fn list<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Paginated<Event>>, ApiError> {
  let store = catalog.store_for_code(params.lang.as_deref());
  let filter = EventFilter::from_raw(
    params.year.as_deref(),
    params.month.as_deref(),
    params.day.as_deref(),
  );
  let page = PageRequest::from_raw(params.page.as_deref(), params.limit.as_deref());

  let total = store.count_events(&filter).await?;
  let events = store
    .list_events(&filter, page.per_page, page.offset())
    .await?;

  Ok(Json(Paginated { events, pagination: Pagination::new(page, total) }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct LangParam {
  pub lang: Option<String>,
}

/// `GET /events/:id`
pub async fn get_one<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<String>,
  Query(params): Query<LangParam>,
) -> Result<impl IntoResponse, ApiError> {
  let id = parse_id(&id)?;
  let store = catalog.store_for_code(params.lang.as_deref());

  let event = store
    .get_event(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(json!({ "data": event })))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /events` — returns 201 + the stored [`Event`].
pub async fn create<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<LangParam>,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
  let store = catalog.store_for_code(params.lang.as_deref());
  let event = store.create_event(body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "data": event }))))
}

/// `POST /events/batch` — body is a JSON array of [`NewEvent`]; the whole
/// batch commits or none of it does.
pub async fn create_batch<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Query(params): Query<LangParam>,
  Json(body): Json<Vec<NewEvent>>,
) -> Result<impl IntoResponse, ApiError> {
  if body.is_empty() {
    return Err(ApiError::BadRequest("batch must not be empty".into()));
  }
  let store = catalog.store_for_code(params.lang.as_deref());
  let events = store.create_events(body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "data": events }))))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /events/:id` — body is an [`EventPatch`] field mask; absent fields
/// are left unchanged.
pub async fn update_one<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<String>,
  Query(params): Query<LangParam>,
  Json(patch): Json<EventPatch>,
) -> Result<impl IntoResponse, ApiError> {
  let id = parse_id(&id)?;
  let store = catalog.store_for_code(params.lang.as_deref());
  let event = store.update_event(id, patch).await?;
  Ok(Json(json!({ "data": event })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /events/:id` — 204 on success, 404 for unknown ids.
pub async fn delete_one<S: EventStore>(
  State(catalog): State<Arc<Catalog<S>>>,
  Path(id): Path<String>,
  Query(params): Query<LangParam>,
) -> Result<StatusCode, ApiError> {
  let id = parse_id(&id)?;
  let store = catalog.store_for_code(params.lang.as_deref());
  store.delete_event(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
