//! # Inbound Ports (Driving Ports / API)
//!
//! The authentication API offered to the HTTP layer.

use crate::domain::errors::AuthError;
use async_trait::async_trait;
use skill_types::SkillRequest;

/// The parts of an HTTP request the gate looks at.
///
/// `body` must be the exact bytes received on the wire.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub cert_chain_url: Option<&'a str>,
    pub signature: Option<&'a str>,
    pub body: &'a [u8],
}

impl<'a> InboundRequest<'a> {
    pub fn new(cert_chain_url: Option<&'a str>, signature: Option<&'a str>, body: &'a [u8]) -> Self {
        Self {
            cert_chain_url,
            signature,
            body,
        }
    }
}

/// Decides whether a request genuinely comes from the platform.
#[async_trait]
pub trait RequestAuthenticator: Send + Sync {
    /// Run every check and return the decoded envelope.
    ///
    /// Checks run in a fixed order and stop at the first failure.
    async fn authenticate(
        &self,
        request: InboundRequest<'_>,
        expected_application_id: &str,
    ) -> Result<SkillRequest, AuthError>;
}
