//! HTTPS certificate bundle fetcher.

use crate::domain::errors::FetchError;
use crate::domain::policy::AuthPolicy;
use crate::ports::outbound::CertificateFetcher;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tracing::debug;

/// Fetches bundles over HTTPS with a timeout and a size cap.
///
/// Redirects are not followed: a redirect could lead away from the host the
/// URL rules admitted.
#[derive(Debug, Clone)]
pub struct HttpCertificateFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpCertificateFetcher {
    pub fn new(policy: &AuthPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(policy.fetch_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(client, policy.max_chain_bytes))
    }

    pub fn with_client(client: reqwest::Client, max_bytes: usize) -> Self {
        Self { client, max_bytes }
    }
}

#[async_trait]
impl CertificateFetcher for HttpCertificateFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        debug!(url, "Fetching certificate chain");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_bytes,
        };

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(too_large());
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| FetchError::Read {
            url: url.to_string(),
            reason: e.to_string(),
        })? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url, bytes = body.len(), "Fetched certificate chain");
        Ok(body.freeze())
    }
}
