//! Typed client for the tag-exploration HTTP API.
//!
//! The remote service exposes three read-only endpoints: prefix completion,
//! tag correlations, and post counts over time. This crate owns the wire
//! shapes, normalizes legacy response variants, and rejects responses that
//! violate the documented invariants before they reach the session core.

mod client;
mod error;
pub mod model;

pub use client::DEFAULT_API_BASE;
pub use client::ExplorerClient;
pub use error::ApiError;
