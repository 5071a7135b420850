//! Core types and trait definitions for the Chronicle event catalog.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod catalog;
pub mod error;
pub mod event;
pub mod query;
pub mod store;

pub use error::{Error, Result};
