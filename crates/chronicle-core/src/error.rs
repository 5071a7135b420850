//! Error types for `chronicle-core`.

use thiserror::Error;

/// The error kinds a store operation can surface.
///
/// `Validation` is always the caller's fault and never retried;
/// `EventNotFound` is a normal outcome, not an application fault;
/// `Storage` wraps whatever the backend failed with and is reported as an
/// internal failure.
#[derive(Debug, Error)]
pub enum Error {
  #[error("validation error: {0}")]
  Validation(String),

  #[error("event not found: {0}")]
  EventNotFound(u32),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box an arbitrary backend error into the `Storage` kind.
  pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
