//! SQL schema for the Chronicle SQLite store.
//!
//! Executed on every startup; idempotent thanks to `IF NOT EXISTS`. The FTS5
//! table is an external-content index over `events`, and the three triggers
//! fire inside the same statement as the table mutation, so the index can
//! never drift from the table.

/// Full schema DDL.
///
/// `"references"` is a reserved word in SQLite and stays quoted everywhere.
pub const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS events (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    date         TEXT NOT NULL,   -- calendar date, YYYY-MM-DD
    title        TEXT NOT NULL,
    description  TEXT,
    tags         TEXT,            -- JSON array as string
    media        TEXT,            -- link to media file
    "references" TEXT,            -- JSON array as string
    created_at   TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
CREATE INDEX IF NOT EXISTS idx_events_tags ON events(tags);

CREATE VIRTUAL TABLE IF NOT EXISTS events_fts USING fts5(
    title, description, tags,
    content='events', content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS events_ai AFTER INSERT ON events BEGIN
  INSERT INTO events_fts(rowid, title, description, tags)
  VALUES (new.id, new.title, new.description, new.tags);
END;

CREATE TRIGGER IF NOT EXISTS events_ad AFTER DELETE ON events BEGIN
  INSERT INTO events_fts(events_fts, rowid, title, description, tags)
  VALUES ('delete', old.id, old.title, old.description, old.tags);
END;

CREATE TRIGGER IF NOT EXISTS events_au AFTER UPDATE ON events BEGIN
  INSERT INTO events_fts(events_fts, rowid, title, description, tags)
  VALUES ('delete', old.id, old.title, old.description, old.tags);
  INSERT INTO events_fts(rowid, title, description, tags)
  VALUES (new.id, new.title, new.description, new.tags);
END;

PRAGMA user_version = 1;
"#;
