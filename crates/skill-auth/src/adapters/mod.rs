//! # Adapters Layer
//!
//! - `http_fetcher`: HTTPS certificate bundle retrieval.
//! - `cache`: URL-keyed bundle cache wrapping any fetcher.
//! - `system_roots`: host trust store loading.

pub mod cache;
pub mod http_fetcher;
pub mod system_roots;
