//! The `EventStore` trait.
//!
//! Implemented by storage backends (e.g. `chronicle-store-sqlite`). Higher
//! layers (`chronicle-api`, `chronicle-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Every mutation must keep the backend's text-search index in lockstep with
//! the event table: after a successful create/update/delete, a subsequent
//! `search_events` reflects the new state, and an index-maintenance failure
//! fails the whole write (no partial commit).

use std::future::Future;

use crate::{
  Result,
  event::{Event, EventPatch, NewEvent},
  query::{EventFilter, SearchHit, TagCount},
};

/// Abstraction over one language variant's event table + search index pair.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  // ── CRUD ──────────────────────────────────────────────────────────────

  /// Validate and persist a new event; the store assigns `id`,
  /// `created_at` and `updated_at`.
  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event>> + Send + '_;

  /// Persist a batch of events in a single transaction: either all are
  /// committed or none.
  fn create_events(
    &self,
    inputs: Vec<NewEvent>,
  ) -> impl Future<Output = Result<Vec<Event>>> + Send + '_;

  /// Fetch an event by id. Returns `None` if not found.
  fn get_event(
    &self,
    id: u32,
  ) -> impl Future<Output = Result<Option<Event>>> + Send + '_;

  /// Apply a partial update; only the fields present in `patch` change and
  /// `updated_at` is refreshed. Errors with `EventNotFound` for unknown ids.
  fn update_event(
    &self,
    id: u32,
    patch: EventPatch,
  ) -> impl Future<Output = Result<Event>> + Send + '_;

  /// Delete by id. Errors with `EventNotFound` for unknown ids.
  fn delete_event(
    &self,
    id: u32,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  // ── Listing ───────────────────────────────────────────────────────────

  /// Number of events matching `filter`.
  fn count_events<'a>(
    &'a self,
    filter: &'a EventFilter,
  ) -> impl Future<Output = Result<u64>> + Send + 'a;

  /// One page of events matching `filter`, ordered by date descending
  /// (id descending as the deterministic tie-break).
  fn list_events<'a>(
    &'a self,
    filter: &'a EventFilter,
    limit: u32,
    offset: u32,
  ) -> impl Future<Output = Result<Vec<Event>>> + Send + 'a;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// All tags in use, case-folded, counted per occurrence, sorted
  /// alphabetically. Rows whose `tags` field is not a valid JSON array are
  /// silently excluded.
  fn list_tags(&self) -> impl Future<Output = Result<Vec<TagCount>>> + Send + '_;

  // ── Free-text search ──────────────────────────────────────────────────

  /// One page of ranked matches for `query` over title/description/tags,
  /// best match first. An empty query is a validation error.
  fn search_events<'a>(
    &'a self,
    query: &'a str,
    limit: u32,
    offset: u32,
  ) -> impl Future<Output = Result<Vec<SearchHit>>> + Send + 'a;

  /// Total number of matches for `query`.
  fn count_search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<u64>> + Send + 'a;
}
