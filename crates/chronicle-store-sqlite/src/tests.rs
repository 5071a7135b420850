//! Integration tests for `SqliteStore` against an in-memory database.

use chronicle_core::{
  Error,
  event::{EventPatch, NewEvent},
  query::EventFilter,
  store::EventStore,
};
use chrono::NaiveDate;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn event_on(y: i32, m: u32, d: u32, title: &str) -> NewEvent {
  NewEvent {
    date: Some(date(y, m, d)),
    title: title.into(),
    ..Default::default()
  }
}

fn pizza_day() -> NewEvent {
  NewEvent {
    date: Some(date(2010, 5, 22)),
    title: "Pizza Day".into(),
    description: Some("10,000 BTC for two pizzas".into()),
    tags: Some(r#"["first","adoption"]"#.into()),
    ..Default::default()
  }
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_roundtrips() {
  let s = store().await;

  let created = s.create_event(pizza_day()).await.unwrap();
  assert!(created.id >= 1);
  assert_eq!(created.date, date(2010, 5, 22));

  let fetched = s.get_event(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_rejects_blank_title() {
  let s = store().await;
  let err = s
    .create_event(event_on(2021, 1, 1, "   "))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn create_rejects_missing_date() {
  let s = store().await;
  let input = NewEvent { title: "No date".into(), ..Default::default() };
  let err = s.create_event(input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get_event(999_999).await.unwrap().is_none());
}

#[tokio::test]
async fn ids_are_never_reused() {
  let s = store().await;

  let first = s.create_event(event_on(2020, 1, 1, "one")).await.unwrap();
  s.delete_event(first.id).await.unwrap();

  let second = s.create_event(event_on(2020, 1, 2, "two")).await.unwrap();
  assert!(second.id > first.id);
}

// ─── Batch create ────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_create_assigns_distinct_ids() {
  let s = store().await;

  let created = s
    .create_events(vec![
      event_on(2019, 1, 1, "a"),
      event_on(2019, 1, 2, "b"),
      event_on(2019, 1, 3, "c"),
    ])
    .await
    .unwrap();

  assert_eq!(created.len(), 3);
  assert!(created[0].id < created[1].id && created[1].id < created[2].id);
  assert_eq!(s.count_events(&EventFilter::default()).await.unwrap(), 3);
}

#[tokio::test]
async fn batch_create_writes_nothing_on_invalid_input() {
  let s = store().await;

  let err = s
    .create_events(vec![event_on(2019, 1, 1, "ok"), event_on(2019, 1, 2, "")])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert_eq!(s.count_events(&EventFilter::default()).await.unwrap(), 0);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_applies_only_supplied_fields() {
  let s = store().await;
  let created = s.create_event(pizza_day()).await.unwrap();

  let patch = EventPatch {
    description: Some("two Papa John's pizzas".into()),
    ..Default::default()
  };
  let updated = s.update_event(created.id, patch).await.unwrap();

  assert_eq!(updated.title, created.title);
  assert_eq!(updated.date, created.date);
  assert_eq!(updated.tags, created.tags);
  assert_eq!(updated.description.as_deref(), Some("two Papa John's pizzas"));
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
  let s = store().await;
  let patch = EventPatch { title: Some("x".into()), ..Default::default() };
  let err = s.update_event(42, patch).await.unwrap_err();
  assert!(matches!(err, Error::EventNotFound(42)));
}

#[tokio::test]
async fn update_with_empty_mask_is_a_validation_error() {
  let s = store().await;
  let created = s.create_event(pizza_day()).await.unwrap();
  let err = s
    .update_event(created.id, EventPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_then_get_returns_none() {
  let s = store().await;
  let created = s.create_event(pizza_day()).await.unwrap();

  s.delete_event(created.id).await.unwrap();
  assert!(s.get_event(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
  let s = store().await;
  let err = s.delete_event(7).await.unwrap_err();
  assert!(matches!(err, Error::EventNotFound(7)));
}

// ─── Listing, filters, pagination ────────────────────────────────────────────

#[tokio::test]
async fn list_orders_by_date_descending() {
  let s = store().await;
  s.create_event(event_on(2009, 1, 3, "genesis")).await.unwrap();
  s.create_event(event_on(2021, 9, 7, "legal tender")).await.unwrap();
  s.create_event(event_on(2010, 5, 22, "pizza")).await.unwrap();

  let events = s
    .list_events(&EventFilter::default(), 20, 0)
    .await
    .unwrap();
  let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, ["legal tender", "pizza", "genesis"]);
}

#[tokio::test]
async fn year_filter_applies_while_invalid_month_was_dropped() {
  let s = store().await;
  s.create_event(event_on(2021, 2, 1, "in range")).await.unwrap();
  s.create_event(event_on(2021, 11, 5, "also in range")).await.unwrap();
  s.create_event(event_on(2020, 2, 1, "other year")).await.unwrap();

  // month=13 is out of range: dropped by the parser, year kept.
  let filter = EventFilter::from_raw(Some("2021"), Some("13"), None);
  assert_eq!(s.count_events(&filter).await.unwrap(), 2);

  let events = s.list_events(&filter, 20, 0).await.unwrap();
  assert!(events.iter().all(|e| e.date.format("%Y").to_string() == "2021"));
}

#[tokio::test]
async fn month_and_day_filters_use_padded_components() {
  let s = store().await;
  s.create_event(event_on(2021, 5, 9, "match")).await.unwrap();
  s.create_event(event_on(2021, 5, 10, "wrong day")).await.unwrap();
  s.create_event(event_on(2021, 6, 9, "wrong month")).await.unwrap();

  let filter = EventFilter::from_raw(None, Some("5"), Some("9"));
  let events = s.list_events(&filter, 20, 0).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].title, "match");
}

#[tokio::test]
async fn pagination_concatenates_to_the_full_ordered_result() {
  let s = store().await;
  for d in 1..=5 {
    s.create_event(event_on(2022, 3, d, &format!("event {d}")))
      .await
      .unwrap();
  }

  let filter = EventFilter::default();
  let full = s.list_events(&filter, 100, 0).await.unwrap();
  assert_eq!(full.len(), 5);

  let mut paged = Vec::new();
  for page in 0..3 {
    let chunk = s.list_events(&filter, 2, page * 2).await.unwrap();
    assert!(chunk.len() <= 2);
    paged.extend(chunk);
  }
  assert_eq!(paged, full);
}

#[tokio::test]
async fn same_date_rows_have_a_stable_order() {
  let s = store().await;
  let a = s.create_event(event_on(2022, 3, 1, "a")).await.unwrap();
  let b = s.create_event(event_on(2022, 3, 1, "b")).await.unwrap();

  let events = s
    .list_events(&EventFilter::default(), 20, 0)
    .await
    .unwrap();
  // id descending breaks the tie deterministically.
  assert_eq!(events[0].id, b.id);
  assert_eq!(events[1].id, a.id);
}

// ─── Tags ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tags_are_folded_counted_and_sorted() {
  let s = store().await;

  let mut halving = event_on(2012, 11, 28, "halving");
  halving.tags = Some(r#"["Lightning","lightning"]"#.into());
  s.create_event(halving).await.unwrap();

  s.create_event(pizza_day()).await.unwrap();

  let tags = s.list_tags().await.unwrap();
  let pairs: Vec<(&str, u64)> =
    tags.iter().map(|t| (t.tag.as_str(), t.count)).collect();
  assert_eq!(pairs, [("adoption", 1), ("first", 1), ("lightning", 2)]);
}

#[tokio::test]
async fn malformed_tag_rows_are_skipped_not_errors() {
  let s = store().await;

  let mut bad = event_on(2015, 1, 1, "bad tags");
  bad.tags = Some("not-json".into());
  s.create_event(bad).await.unwrap();

  let mut object = event_on(2015, 1, 2, "object tags");
  object.tags = Some(r#"{"tag":"x"}"#.into());
  s.create_event(object).await.unwrap();

  let mut empty = event_on(2015, 1, 3, "empty tags");
  empty.tags = Some("[]".into());
  s.create_event(empty).await.unwrap();

  let mut blanks = event_on(2015, 1, 4, "blank entries");
  blanks.tags = Some(r#"["  ","real"]"#.into());
  s.create_event(blanks).await.unwrap();

  s.create_event(event_on(2015, 1, 5, "no tags")).await.unwrap();

  let tags = s.list_tags().await.unwrap();
  let pairs: Vec<(&str, u64)> =
    tags.iter().map(|t| (t.tag.as_str(), t.count)).collect();
  assert_eq!(pairs, [("real", 1)]);
}

#[tokio::test]
async fn tag_filter_matches_case_insensitively() {
  let s = store().await;
  s.create_event(pizza_day()).await.unwrap();
  s.create_event(event_on(2011, 2, 9, "parity")).await.unwrap();

  let filter = EventFilter::with_tag("Adoption");
  assert_eq!(s.count_events(&filter).await.unwrap(), 1);

  let events = s.list_events(&filter, 20, 0).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].title, "Pizza Day");
}

#[tokio::test]
async fn tag_filter_requires_the_quoted_token() {
  let s = store().await;
  s.create_event(pizza_day()).await.unwrap();

  // "adopt" is a proper substring of the tag but not a quoted token.
  let filter = EventFilter::with_tag("adopt");
  assert_eq!(s.count_events(&filter).await.unwrap(), 0);
}

// ─── Free-text search ────────────────────────────────────────────────────────

#[tokio::test]
async fn search_finds_inserted_event() {
  let s = store().await;
  s.create_event(pizza_day()).await.unwrap();

  let hits = s.search_events("pizzas", 20, 0).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].event.title, "Pizza Day");
  assert_eq!(s.count_search("pizzas").await.unwrap(), 1);
}

#[tokio::test]
async fn search_reflects_updates() {
  let s = store().await;
  let created = s.create_event(pizza_day()).await.unwrap();

  let patch = EventPatch {
    title: Some("Laszlo's purchase".into()),
    description: Some("a famous transaction".into()),
    ..Default::default()
  };
  s.update_event(created.id, patch).await.unwrap();

  assert_eq!(s.count_search("laszlo").await.unwrap(), 1);
  // The old title is gone from the index.
  assert_eq!(s.count_search("pizza").await.unwrap(), 0);
}

#[tokio::test]
async fn search_never_returns_deleted_events() {
  let s = store().await;
  let created = s.create_event(pizza_day()).await.unwrap();
  s.delete_event(created.id).await.unwrap();

  assert!(s.search_events("pizza", 20, 0).await.unwrap().is_empty());
  assert_eq!(s.count_search("pizza").await.unwrap(), 0);
}

#[tokio::test]
async fn search_matches_tags_text() {
  let s = store().await;
  s.create_event(pizza_day()).await.unwrap();

  assert_eq!(s.count_search("adoption").await.unwrap(), 1);
}

#[tokio::test]
async fn equal_ranks_break_ties_by_id_ascending() {
  let s = store().await;
  let a = s.create_event(event_on(2013, 4, 1, "halving")).await.unwrap();
  let b = s.create_event(event_on(2016, 7, 9, "halving")).await.unwrap();

  let hits = s.search_events("halving", 20, 0).await.unwrap();
  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].event.id, a.id);
  assert_eq!(hits[1].event.id, b.id);
}

#[tokio::test]
async fn query_syntax_characters_are_neutralized() {
  let s = store().await;
  s.create_event(pizza_day()).await.unwrap();

  // None of these may surface as an FTS5 syntax error.
  for q in [r#""pizza"#, "pizza*", "NEAR(pizza)", "title:pizza", "-pizza"] {
    let result = s.search_events(q, 20, 0).await;
    assert!(result.is_ok(), "query {q:?} failed: {result:?}");
  }

  // Operators are matched literally, not interpreted: no row contains the
  // literal token "or".
  assert_eq!(s.count_search("pizza OR nothing").await.unwrap(), 0);
}

#[tokio::test]
async fn empty_search_query_is_a_validation_error() {
  let s = store().await;
  for q in ["", "   "] {
    let err = s.search_events(q, 20, 0).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }
}

#[tokio::test]
async fn search_pagination_is_stable() {
  let s = store().await;
  for d in 1..=5 {
    s.create_event(event_on(2018, 2, d, "conference talk"))
      .await
      .unwrap();
  }

  let full = s.search_events("conference", 100, 0).await.unwrap();
  assert_eq!(full.len(), 5);

  let mut paged = Vec::new();
  for page in 0..3 {
    paged.extend(s.search_events("conference", 2, page * 2).await.unwrap());
  }
  assert_eq!(paged, full);
}

// ─── Match-expression escaping ───────────────────────────────────────────────

#[test]
fn match_expr_quotes_every_term() {
  assert_eq!(
    crate::store::fts_match_expr("pizza day").unwrap(),
    r#""pizza" "day""#
  );
}

#[test]
fn match_expr_doubles_embedded_quotes() {
  assert_eq!(
    crate::store::fts_match_expr(r#"say "cheese""#).unwrap(),
    r#""say" """cheese""""#
  );
}

#[test]
fn match_expr_rejects_blank_input() {
  assert!(matches!(
    crate::store::fts_match_expr("  "),
    Err(Error::Validation(_))
  ));
}

// ─── Startup backfill ────────────────────────────────────────────────────────

fn temp_db_path(name: &str) -> std::path::PathBuf {
  std::env::temp_dir().join(format!(
    "chronicle-store-test-{}-{name}.db",
    std::process::id()
  ))
}

#[tokio::test]
async fn open_backfills_an_empty_index() {
  let path = temp_db_path("backfill");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_event(pizza_day()).await.unwrap();
  }

  // Wipe the index behind the store's back, as if the database predated it.
  {
    let raw = rusqlite::Connection::open(&path).unwrap();
    raw
      .execute("INSERT INTO events_fts(events_fts) VALUES ('delete-all')", [])
      .unwrap();

    // The index is now empty while the events table is not. COUNT(*) on an
    // external-content table cannot see this: it reads through to events.
    let matches: i64 = raw
      .query_row(
        "SELECT COUNT(*) FROM events_fts WHERE events_fts MATCH 'pizza'",
        [],
        |r| r.get(0),
      )
      .unwrap();
    assert_eq!(matches, 0);
    let through: i64 = raw
      .query_row("SELECT COUNT(*) FROM events_fts", [], |r| r.get(0))
      .unwrap();
    assert_eq!(through, 1);
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let hits = s.search_events("pizza", 20, 0).await.unwrap();
  assert_eq!(hits.len(), 1);

  let _ = std::fs::remove_file(&path);
}
