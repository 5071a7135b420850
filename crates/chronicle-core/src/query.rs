//! Query-engine parameter types: date filters, pagination, tag counts and
//! ranked search hits.
//!
//! Filter and pagination parsing is deliberately permissive: a value that
//! does not parse, or is out of range, is ignored with a warning rather than
//! rejected. Listing endpoints must keep working no matter what the caller
//! puts in the query string.

use serde::Serialize;

use crate::event::Event;

// ─── Date filter ─────────────────────────────────────────────────────────────

/// Normalized year/month/day filter components, combined with AND semantics.
///
/// Values are stored as the exact strings compared against
/// `strftime('%Y'|'%m'|'%d', date)`, with month and day zero-padded to two
/// digits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
  pub year:  Option<String>,
  pub month: Option<String>,
  pub day:   Option<String>,
  /// Tag-membership filter: matched as the quoted tag token against the raw
  /// stored JSON text, case-insensitively.
  pub tag:   Option<String>,
}

impl EventFilter {
  /// Build a filter from raw query-string values.
  ///
  /// Each component that fails to parse as a number, or falls outside its
  /// valid range (month 1–12, day 1–31), is dropped with a warning and the
  /// query proceeds as if it were absent.
  pub fn from_raw(
    year: Option<&str>,
    month: Option<&str>,
    day: Option<&str>,
  ) -> Self {
    let year = year.and_then(|raw| match raw.parse::<i32>() {
      Ok(_) => Some(raw.to_owned()),
      Err(_) => {
        tracing::warn!(year = raw, "ignoring unparsable year filter");
        None
      }
    });

    let month = month.and_then(|raw| match raw.parse::<u32>() {
      Ok(m) if (1..=12).contains(&m) => Some(format!("{m:02}")),
      _ => {
        tracing::warn!(month = raw, "ignoring invalid month filter");
        None
      }
    });

    let day = day.and_then(|raw| match raw.parse::<u32>() {
      Ok(d) if (1..=31).contains(&d) => Some(format!("{d:02}")),
      _ => {
        tracing::warn!(day = raw, "ignoring invalid day filter");
        None
      }
    });

    Self { year, month, day, tag: None }
  }

  pub fn with_tag(tag: impl Into<String>) -> Self {
    Self { tag: Some(tag.into()), ..Default::default() }
  }

  pub fn is_empty(&self) -> bool {
    self.year.is_none()
      && self.month.is_none()
      && self.day.is_none()
      && self.tag.is_none()
  }
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// A validated page request. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:     u32,
  pub per_page: u32,
}

pub const DEFAULT_PER_PAGE: u32 = 20;

impl Default for PageRequest {
  fn default() -> Self {
    Self { page: 1, per_page: DEFAULT_PER_PAGE }
  }
}

impl PageRequest {
  /// Coerce raw query-string values: anything non-numeric or below 1 falls
  /// back to the default (page 1, 20 per page) with a warning.
  pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
    let page = match page {
      None => 1,
      Some(raw) => match raw.parse::<u32>() {
        Ok(p) if p >= 1 => p,
        _ => {
          tracing::warn!(page = raw, "invalid page parameter, using 1");
          1
        }
      },
    };
    let per_page = match per_page {
      None => DEFAULT_PER_PAGE,
      Some(raw) => match raw.parse::<u32>() {
        Ok(l) if l >= 1 => l,
        _ => {
          tracing::warn!(
            limit = raw,
            "invalid limit parameter, using {DEFAULT_PER_PAGE}"
          );
          DEFAULT_PER_PAGE
        }
      },
    };
    Self { page, per_page }
  }

  pub fn offset(&self) -> u32 {
    (self.page - 1).saturating_mul(self.per_page)
  }
}

/// Pagination metadata returned alongside every page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
  pub current_page: u32,
  pub per_page:     u32,
  pub total:        u64,
  pub last_page:    u32,
}

impl Pagination {
  /// `last_page = ceil(total / per_page)`; reports 0 pages when `per_page`
  /// is non-positive.
  pub fn new(request: PageRequest, total: u64) -> Self {
    let last_page = if request.per_page == 0 {
      0
    } else {
      total.div_ceil(u64::from(request.per_page)) as u32
    };
    Self {
      current_page: request.page,
      per_page: request.per_page,
      total,
      last_page,
    }
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// One case-folded tag and the number of occurrences across all events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
  pub tag:   String,
  pub count: u64,
}

/// One free-text search result: the event plus the relevance rank the index
/// assigned it (lower ranks first).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
  #[serde(flatten)]
  pub event: Event,
  pub rank:  f64,
}
