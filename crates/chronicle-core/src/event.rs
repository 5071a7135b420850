//! Event types, the canonical unit stored and returned by the catalog.
//!
//! `tags` and `references` are JSON-encoded array strings and stay that way
//! through storage and the API: the core never decodes them into structured
//! arrays. The tag aggregation in the store reads them with SQL `json_each`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Event ───────────────────────────────────────────────────────────────────

/// A dated historical event as persisted in one language variant.
///
/// `id` is assigned by storage on creation and never reused; it is only
/// unique within its own variant. `created_at` / `updated_at` are set by the
/// store, never by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
  pub id:          u32,
  pub date:        NaiveDate,
  pub title:       String,
  pub description: Option<String>,
  /// JSON-encoded array of short strings, e.g. `["first","adoption"]`.
  pub tags:        Option<String>,
  /// URL (or encoded list of URLs), opaque to the core.
  pub media:       Option<String>,
  /// JSON-encoded array of URL strings.
  pub references:  Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Caller-supplied fields for creating an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEvent {
  pub date:        Option<NaiveDate>,
  pub title:       String,
  pub description: Option<String>,
  pub tags:        Option<String>,
  pub media:       Option<String>,
  pub references:  Option<String>,
}

impl NewEvent {
  /// Reject inputs that the table must never accept: an empty title or an
  /// unset date.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::Validation("title must not be empty".into()));
    }
    if self.date.is_none() {
      return Err(Error::Validation("date is required".into()));
    }
    Ok(())
  }
}

// ─── EventPatch ──────────────────────────────────────────────────────────────

/// Field mask for partial updates: `None` means "leave unchanged".
///
/// There is deliberately no way to clear a field back to NULL; the mask only
/// carries replacement values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
  pub date:        Option<NaiveDate>,
  pub title:       Option<String>,
  pub description: Option<String>,
  pub tags:        Option<String>,
  pub media:       Option<String>,
  pub references:  Option<String>,
}

impl EventPatch {
  /// `true` when no field is supplied at all.
  pub fn is_empty(&self) -> bool {
    self.date.is_none()
      && self.title.is_none()
      && self.description.is_none()
      && self.tags.is_none()
      && self.media.is_none()
      && self.references.is_none()
  }

  /// A supplied title must still be non-empty.
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      if title.trim().is_empty() {
        return Err(Error::Validation("title must not be empty".into()));
      }
    }
    if self.is_empty() {
      return Err(Error::Validation("no fields to update".into()));
    }
    Ok(())
  }
}
