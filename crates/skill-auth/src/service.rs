//! # Request Gate
//!
//! Application service implementing [`RequestAuthenticator`]. Runs every check
//! in a fixed order and stops at the first failure:
//!
//! 1. Both signature headers present.
//! 2. Certificate chain URL rules (no network access before this passes).
//! 3. Bundle fetch through the injected [`CertificateFetcher`].
//! 4. Chain validation, yielding the leaf RSA key.
//! 5. Signature over the raw body.
//! 6. Body decoding, then timestamp freshness.
//! 7. Application id match.
//! 8. Request type is one of the three recognized kinds.

use crate::domain::chain::{validate_chain, TrustStore};
use crate::domain::errors::AuthError;
use crate::domain::freshness::check_freshness;
use crate::domain::policy::AuthPolicy;
use crate::domain::signature::verify_body_signature;
use crate::domain::url::validate_cert_chain_url;
use crate::ports::inbound::{InboundRequest, RequestAuthenticator};
use crate::ports::outbound::{CertificateFetcher, SystemTimeSource, TimeSource};
use crate::{CERT_CHAIN_URL_HEADER, SIGNATURE_HEADER};
use async_trait::async_trait;
use skill_types::SkillRequest;
use std::sync::Arc;
use tracing::debug;

/// Authenticates inbound skill requests.
///
/// Cheap to clone; all state is shared behind `Arc`.
#[derive(Clone)]
pub struct RequestGate {
    fetcher: Arc<dyn CertificateFetcher>,
    clock: Arc<dyn TimeSource>,
    trust_store: Arc<TrustStore>,
    policy: AuthPolicy,
}

impl RequestGate {
    /// Create a gate using the system clock.
    pub fn new(
        fetcher: Arc<dyn CertificateFetcher>,
        trust_store: TrustStore,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            fetcher,
            clock: Arc::new(SystemTimeSource),
            trust_store: Arc::new(trust_store),
            policy,
        }
    }

    /// Replace the clock used for validity windows and freshness.
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }
}

#[async_trait]
impl RequestAuthenticator for RequestGate {
    async fn authenticate(
        &self,
        request: InboundRequest<'_>,
        expected_application_id: &str,
    ) -> Result<SkillRequest, AuthError> {
        let cert_url = non_blank(request.cert_chain_url)
            .ok_or(AuthError::MissingHeader(CERT_CHAIN_URL_HEADER))?;
        let signature =
            non_blank(request.signature).ok_or(AuthError::MissingHeader(SIGNATURE_HEADER))?;

        let url = validate_cert_chain_url(cert_url, &self.policy)?;
        let bundle = self.fetcher.fetch(url.as_str()).await?;

        let now = self.clock.now();
        let leaf_key = validate_chain(&bundle, &self.trust_store, &self.policy, now)?;
        verify_body_signature(&leaf_key, signature, request.body, self.policy.signature_scheme)?;

        let envelope = SkillRequest::from_json_slice(request.body)
            .map_err(|e| AuthError::MalformedBody(e.to_string()))?;

        check_freshness(&envelope.body.timestamp, now, &self.policy)?;

        let application_id = envelope.application_id();
        if !application_id.is_some_and(|id| constant_time_compare(id, expected_application_id)) {
            return Err(AuthError::ApplicationIdMismatch {
                expected: expected_application_id.to_string(),
                actual: application_id.map(str::to_string),
            });
        }

        if envelope.kind().is_none() {
            return Err(AuthError::UnrecognizedRequestType(
                envelope.body.request_type.clone(),
            ));
        }

        debug!(
            request_id = %envelope.body.request_id,
            request_type = %envelope.body.request_type,
            "Request authenticated"
        );
        Ok(envelope)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Constant-time string comparison.
///
/// The shorter input is padded with a different byte so unequal lengths never
/// compare equal, and the length check itself is constant-time.
fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}
