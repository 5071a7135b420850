//! API-key middleware.
//!
//! Keys arrive in the `X-API-KEY` header and are compared in constant time:
//! both sides are hashed to fixed-length SHA-256 digests first, so neither
//! key length nor content can leak through timing.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Request, State},
  http::StatusCode,
  middleware::Next,
  response::{IntoResponse, Response},
};
use serde_json::json;
use sha2::{Digest, Sha256};

/// The set of credentials accepted by this server instance. Immutable after
/// startup.
#[derive(Clone)]
pub struct ApiKeys {
  digests: Vec<[u8; 32]>,
}

impl ApiKeys {
  /// Parse a comma-separated key list; blank entries are dropped. Returns
  /// `None` when no usable key remains.
  pub fn parse(raw: &str) -> Option<Self> {
    let digests: Vec<[u8; 32]> = raw
      .split(',')
      .map(str::trim)
      .filter(|k| !k.is_empty())
      .map(|k| Sha256::digest(k.as_bytes()).into())
      .collect();
    if digests.is_empty() { None } else { Some(Self { digests }) }
  }

  pub fn len(&self) -> usize {
    self.digests.len()
  }

  pub fn is_empty(&self) -> bool {
    self.digests.is_empty()
  }

  /// `true` if `provided` matches any accepted key. Every stored digest is
  /// checked, with no early exit.
  pub fn verify(&self, provided: &str) -> bool {
    let candidate: [u8; 32] = Sha256::digest(provided.as_bytes()).into();
    let mut ok = false;
    for digest in &self.digests {
      ok |= constant_time_eq(digest, &candidate);
    }
    ok
  }
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
  a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(message: &str) -> Response {
  (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
}

/// axum middleware rejecting requests without a valid `X-API-KEY` header.
pub async fn require_api_key(
  State(keys): State<Arc<ApiKeys>>,
  req: Request,
  next: Next,
) -> Response {
  let provided = req
    .headers()
    .get("x-api-key")
    .and_then(|v| v.to_str().ok())
    .unwrap_or("");

  if provided.is_empty() {
    return unauthorized("API key required");
  }
  if !keys.verify(provided) {
    return unauthorized("invalid API key");
  }
  next.run(req).await
}
