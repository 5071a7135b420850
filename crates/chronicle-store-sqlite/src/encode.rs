//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD` (so `strftime` filters work
//! directly on the column); timestamps as RFC 3339 strings.

use chrono::{DateTime, NaiveDate, Utc};
use chronicle_core::{Error, Result, event::Event};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Storage(format!("bad date column {s:?}: {e}").into()))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Storage(format!("bad timestamp column {s:?}: {e}").into()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`read_event_row`]; keep the two in lockstep.
pub const EVENT_COLUMNS: &str =
  r#"id, date, title, description, tags, media, "references", created_at, updated_at"#;

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub id:          u32,
  pub date:        String,
  pub title:       String,
  pub description: Option<String>,
  pub tags:        Option<String>,
  pub media:       Option<String>,
  pub references:  Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

/// Read a [`RawEvent`] from a row selected with [`EVENT_COLUMNS`].
pub fn read_event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    id:          row.get(0)?,
    date:        row.get(1)?,
    title:       row.get(2)?,
    description: row.get(3)?,
    tags:        row.get(4)?,
    media:       row.get(5)?,
    references:  row.get(6)?,
    created_at:  row.get(7)?,
    updated_at:  row.get(8)?,
  })
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:          self.id,
      date:        decode_date(&self.date)?,
      title:       self.title,
      description: self.description,
      tags:        self.tags,
      media:       self.media,
      references:  self.references,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
