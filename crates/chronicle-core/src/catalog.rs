//! The catalog façade: two independently-opened language variants of the
//! same dataset, selected per request by an explicit language code.
//!
//! The variants share nothing: no cross-variant transactions, no shared
//! ids. The catalog is built once at startup and passed around by `Arc`;
//! there are no process-wide mutable handles.

use crate::store::EventStore;

// ─── Language ────────────────────────────────────────────────────────────────

/// Which language variant a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
  #[default]
  English,
  Russian,
}

impl Language {
  /// `"ru"` (case-insensitive) selects Russian; anything else, including
  /// absent, selects the default English variant.
  pub fn from_code(code: Option<&str>) -> Self {
    match code {
      Some(c) if c.eq_ignore_ascii_case("ru") => Language::Russian,
      _ => Language::English,
    }
  }
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Holds the two variant stores and nothing else.
#[derive(Clone)]
pub struct Catalog<S> {
  english: S,
  russian: S,
}

impl<S: EventStore> Catalog<S> {
  pub fn new(english: S, russian: S) -> Self {
    Self { english, russian }
  }

  /// The store for `language`.
  pub fn store(&self, language: Language) -> &S {
    match language {
      Language::English => &self.english,
      Language::Russian => &self.russian,
    }
  }

  /// Convenience: resolve a raw `lang` query value straight to a store.
  pub fn store_for_code(&self, code: Option<&str>) -> &S {
    self.store(Language::from_code(code))
  }
}
