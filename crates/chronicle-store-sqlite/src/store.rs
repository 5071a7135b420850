//! [`SqliteStore`], the SQLite implementation of [`EventStore`].

use std::path::Path;

use chrono::Utc;
use chronicle_core::{
  Error, Result,
  event::{Event, EventPatch, NewEvent},
  query::{EventFilter, SearchHit, TagCount},
  store::EventStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  encode::{EVENT_COLUMNS, RawEvent, encode_date, encode_dt, read_event_row},
  schema::SCHEMA,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn db_err(e: tokio_rusqlite::Error) -> Error {
  Error::storage(e)
}

/// Column values for one `events` row, pre-encoded to the TEXT forms the
/// schema stores.
struct EventValues {
  date:        String,
  title:       String,
  description: Option<String>,
  tags:        Option<String>,
  media:       Option<String>,
  references:  Option<String>,
  created_at:  String,
  updated_at:  String,
}

fn insert_event(
  conn: &rusqlite::Connection,
  v: &EventValues,
) -> rusqlite::Result<i64> {
  conn.execute(
    r#"INSERT INTO events
         (date, title, description, tags, media, "references", created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
    rusqlite::params![
      v.date,
      v.title,
      v.description,
      v.tags,
      v.media,
      v.references,
      v.created_at,
      v.updated_at,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn assigned_id(rowid: i64) -> Result<u32> {
  u32::try_from(rowid)
    .map_err(|_| Error::Storage(format!("assigned id {rowid} out of range").into()))
}

/// Build the WHERE clause + positional params for an [`EventFilter`].
///
/// The tag condition is the documented quoted-substring scan against the raw
/// JSON text; it may over- or under-match on proper substrings that happen to
/// equal a quoted tag.
fn filter_sql(filter: &EventFilter) -> (String, Vec<String>) {
  let mut conds: Vec<&'static str> = Vec::new();
  let mut params: Vec<String> = Vec::new();

  if let Some(year) = &filter.year {
    conds.push("strftime('%Y', date) = ?");
    params.push(year.clone());
  }
  if let Some(month) = &filter.month {
    conds.push("strftime('%m', date) = ?");
    params.push(month.clone());
  }
  if let Some(day) = &filter.day {
    conds.push("strftime('%d', date) = ?");
    params.push(day.clone());
  }
  if let Some(tag) = &filter.tag {
    conds.push("LOWER(tags) LIKE ?");
    params.push(format!("%\"{}\"%", tag.to_lowercase()));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (where_clause, params)
}

/// Turn user text into an FTS5 MATCH expression that can never be parsed as
/// query syntax: each whitespace-separated term becomes a quoted phrase with
/// embedded quotes doubled.
pub(crate) fn fts_match_expr(query: &str) -> Result<String> {
  let terms: Vec<String> = query
    .split_whitespace()
    .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
    .collect();
  if terms.is_empty() {
    return Err(Error::Validation("search query must not be empty".into()));
  }
  Ok(terms.join(" "))
}

/// Extract, case-fold and count individual tags straight from the JSON
/// arrays in the `tags` column. Rows that are null, empty, `[]`, or not a
/// valid JSON array are skipped entirely; so are blank entries.
const TAGS_SQL: &str = "
SELECT
    LOWER(j.value) AS tag,
    COUNT(*) AS count
FROM
    events e,
    json_each(e.tags) j
WHERE
    e.tags IS NOT NULL
    AND e.tags != ''
    AND e.tags != '[]'
    AND json_valid(e.tags) = 1
    AND json_type(e.tags) = 'array'
    AND j.value IS NOT NULL
    AND TRIM(CAST(j.value AS TEXT)) != ''
GROUP BY
    LOWER(j.value)
ORDER BY
    tag ASC";

// ─── Store ───────────────────────────────────────────────────────────────────

/// One language variant's event table + search index, backed by a single
/// SQLite file in WAL mode.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and, if
  /// the search index is empty while the table is not, rebuild it.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await.map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    store.backfill_index().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(db_err)?;
    let store = Self { conn };
    store.init_schema().await?;
    store.backfill_index().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(db_err)
  }

  /// Self-healing for databases created before the search index existed:
  /// rebuild the index once from all existing rows before serving queries.
  async fn backfill_index(&self) -> Result<()> {
    let rebuilt: i64 = self
      .conn
      .call(|conn| {
        let events: i64 =
          conn.query_row("SELECT COUNT(*) FROM events", [], |r| r.get(0))?;
        // events_fts is external-content, so COUNT(*) on it is answered from
        // the events table. The docsize shadow table counts what is actually
        // indexed.
        let indexed: i64 = conn.query_row(
          "SELECT COUNT(*) FROM events_fts_docsize",
          [],
          |r| r.get(0),
        )?;
        if events > 0 && indexed == 0 {
          conn
            .execute("INSERT INTO events_fts(events_fts) VALUES ('rebuild')", [])?;
          Ok(events)
        } else {
          Ok(0)
        }
      })
      .await
      .map_err(db_err)?;

    if rebuilt > 0 {
      tracing::info!(rows = rebuilt, "rebuilt empty search index from event table");
    }
    Ok(())
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  // ── CRUD ──────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    input.validate()?;
    let date = input
      .date
      .ok_or_else(|| Error::Validation("date is required".into()))?;
    let now = Utc::now();

    let values = EventValues {
      date:        encode_date(date),
      title:       input.title.clone(),
      description: input.description.clone(),
      tags:        input.tags.clone(),
      media:       input.media.clone(),
      references:  input.references.clone(),
      created_at:  encode_dt(now),
      updated_at:  encode_dt(now),
    };

    let rowid = self
      .conn
      .call(move |conn| Ok(insert_event(conn, &values)?))
      .await
      .map_err(db_err)?;

    Ok(Event {
      id:          assigned_id(rowid)?,
      date,
      title:       input.title,
      description: input.description,
      tags:        input.tags,
      media:       input.media,
      references:  input.references,
      created_at:  now,
      updated_at:  now,
    })
  }

  async fn create_events(&self, inputs: Vec<NewEvent>) -> Result<Vec<Event>> {
    // Validate the whole batch up front so nothing is written on failure.
    for input in &inputs {
      input.validate()?;
    }
    let now = Utc::now();
    let now_str = encode_dt(now);

    let values: Vec<EventValues> = inputs
      .iter()
      .map(|input| {
        let date = input
          .date
          .ok_or_else(|| Error::Validation("date is required".into()))?;
        Ok(EventValues {
          date:        encode_date(date),
          title:       input.title.clone(),
          description: input.description.clone(),
          tags:        input.tags.clone(),
          media:       input.media.clone(),
          references:  input.references.clone(),
          created_at:  now_str.clone(),
          updated_at:  now_str.clone(),
        })
      })
      .collect::<Result<_>>()?;

    let rowids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(values.len());
        for v in &values {
          ids.push(insert_event(&tx, v)?);
        }
        tx.commit()?;
        Ok(ids)
      })
      .await
      .map_err(db_err)?;

    inputs
      .into_iter()
      .zip(rowids)
      .map(|(input, rowid)| {
        let date = input
          .date
          .ok_or_else(|| Error::Validation("date is required".into()))?;
        Ok(Event {
          id:          assigned_id(rowid)?,
          date,
          title:       input.title,
          description: input.description,
          tags:        input.tags,
          media:       input.media,
          references:  input.references,
          created_at:  now,
          updated_at:  now,
        })
      })
      .collect()
  }

  async fn get_event(&self, id: u32) -> Result<Option<Event>> {
    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
              rusqlite::params![id],
              read_event_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(db_err)?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn update_event(&self, id: u32, patch: EventPatch) -> Result<Event> {
    patch.validate()?;

    let mut sets: Vec<&'static str> = Vec::new();
    let mut values: Vec<String> = Vec::new();
    if let Some(date) = patch.date {
      sets.push("date = ?");
      values.push(encode_date(date));
    }
    if let Some(title) = patch.title {
      sets.push("title = ?");
      values.push(title);
    }
    if let Some(description) = patch.description {
      sets.push("description = ?");
      values.push(description);
    }
    if let Some(tags) = patch.tags {
      sets.push("tags = ?");
      values.push(tags);
    }
    if let Some(media) = patch.media {
      sets.push("media = ?");
      values.push(media);
    }
    if let Some(references) = patch.references {
      sets.push(r#""references" = ?"#);
      values.push(references);
    }
    sets.push("updated_at = ?");
    values.push(encode_dt(Utc::now()));

    let update_sql = format!("UPDATE events SET {} WHERE id = ?", sets.join(", "));
    let select_sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = {
          let mut p: Vec<&dyn rusqlite::ToSql> =
            values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
          p.push(&id);
          tx.execute(&update_sql, rusqlite::params_from_iter(p))?
        };
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(&select_sql, rusqlite::params![id], read_event_row)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await
      .map_err(db_err)?;

    raw.ok_or(Error::EventNotFound(id))?.into_event()
  }

  async fn delete_event(&self, id: u32) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM events WHERE id = ?1", rusqlite::params![id])?)
      })
      .await
      .map_err(db_err)?;

    if changed == 0 {
      return Err(Error::EventNotFound(id));
    }
    Ok(())
  }

  // ── Listing ───────────────────────────────────────────────────────────────

  async fn count_events(&self, filter: &EventFilter) -> Result<u64> {
    let (where_clause, params) = filter_sql(filter);
    let sql = format!("SELECT COUNT(*) FROM events {where_clause}");

    let total: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &sql,
          rusqlite::params_from_iter(params.iter()),
          |r| r.get(0),
        )?)
      })
      .await
      .map_err(db_err)?;

    Ok(total as u64)
  }

  async fn list_events(
    &self,
    filter: &EventFilter,
    limit: u32,
    offset: u32,
  ) -> Result<Vec<Event>> {
    let (where_clause, params) = filter_sql(filter);
    let sql = format!(
      "SELECT {EVENT_COLUMNS} FROM events {where_clause}
       ORDER BY date DESC, id DESC LIMIT ? OFFSET ?"
    );
    let limit = i64::from(limit);
    let offset = i64::from(offset);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let mut p: Vec<&dyn rusqlite::ToSql> =
          params.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        p.push(&limit);
        p.push(&offset);
        let rows = stmt
          .query_map(rusqlite::params_from_iter(p), read_event_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn list_tags(&self) -> Result<Vec<TagCount>> {
    self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(TAGS_SQL)?;
        let rows = stmt
          .query_map([], |row| {
            Ok(TagCount {
              tag:   row.get(0)?,
              count: row.get::<_, i64>(1)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)
  }

  // ── Free-text search ──────────────────────────────────────────────────────

  async fn search_events(
    &self,
    query: &str,
    limit: u32,
    offset: u32,
  ) -> Result<Vec<SearchHit>> {
    let match_expr = fts_match_expr(query)?;
    let limit = i64::from(limit);
    let offset = i64::from(offset);

    let raws: Vec<(RawEvent, f64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          r#"SELECT
               e.id, e.date, e.title, e.description, e.tags,
               e.media, e."references", e.created_at, e.updated_at,
               events_fts.rank
             FROM events_fts
             JOIN events e ON e.id = events_fts.rowid
             WHERE events_fts MATCH ?1
             ORDER BY events_fts.rank, e.id
             LIMIT ?2 OFFSET ?3"#,
        )?;
        let rows = stmt
          .query_map(rusqlite::params![match_expr, limit, offset], |row| {
            Ok((read_event_row(row)?, row.get::<_, f64>(9)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raws
      .into_iter()
      .map(|(raw, rank)| Ok(SearchHit { event: raw.into_event()?, rank }))
      .collect()
  }

  async fn count_search(&self, query: &str) -> Result<u64> {
    let match_expr = fts_match_expr(query)?;

    let total: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM events_fts WHERE events_fts MATCH ?1",
          rusqlite::params![match_expr],
          |r| r.get(0),
        )?)
      })
      .await
      .map_err(db_err)?;

    Ok(total as u64)
  }
}
