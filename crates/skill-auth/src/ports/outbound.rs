//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the request gate needs from its environment.

use crate::domain::errors::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Retrieves certificate bundles by URL.
///
/// Only ever called with URLs that passed the certificate URL rules.
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    /// Fetch the raw PEM bundle at `url`.
    ///
    /// # Errors
    /// * `FetchError::Network` - connection or timeout failure
    /// * `FetchError::Status` - non-success HTTP status
    /// * `FetchError::TooLarge` - bundle exceeds the configured limit
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
