//! SQLite backend for the Chronicle event store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The FTS5 search index lives in the
//! same database file as the event table and is kept in sync by triggers, so
//! every write is a single failure unit.

mod encode;
mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
