//! Domain types for the gateway: configuration, endpoints and errors.

pub mod config;
pub mod endpoint;
pub mod error;
