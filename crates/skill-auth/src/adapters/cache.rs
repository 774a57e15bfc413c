//! URL-keyed certificate bundle cache.
//!
//! Only successful fetches are stored. Entries are never evicted; bundles are
//! re-validated on every use, so an expired cached chain still fails the
//! validity check.

use crate::domain::errors::FetchError;
use crate::ports::outbound::CertificateFetcher;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Wraps a fetcher so each URL is fetched at most once in the steady state.
///
/// Two concurrent first requests for the same URL may both reach the inner
/// fetcher; the last one to finish wins the slot.
pub struct CachingFetcher<F> {
    inner: F,
    entries: DashMap<String, Bytes>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<F> CachingFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<F: CertificateFetcher> CertificateFetcher for CachingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let cached = self.entries.get(url).map(|entry| entry.value().clone());
        if let Some(bundle) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url, "Certificate chain cache hit");
            return Ok(bundle);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let bundle = self.inner.fetch(url).await?;
        self.entries.insert(url.to_string(), bundle.clone());
        debug!(url, cached = self.entries.len(), "Cached certificate chain");
        Ok(bundle)
    }
}
