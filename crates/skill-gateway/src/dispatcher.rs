//! Path → endpoint dispatch.
//!
//! The endpoint is looked up first (its application id is needed by the
//! gate); the handler runs only after authentication succeeds.

use crate::domain::endpoint::EndpointRegistry;
use crate::domain::error::RequestError;
use axum::http::{HeaderMap, Method};
use skill_auth::{InboundRequest, RequestAuthenticator, CERT_CHAIN_URL_HEADER, SIGNATURE_HEADER};
use std::sync::Arc;
use tracing::debug;

/// Routes authenticated requests to registered handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<EndpointRegistry>,
    authenticator: Arc<dyn RequestAuthenticator>,
}

impl Dispatcher {
    pub fn new(registry: EndpointRegistry, authenticator: Arc<dyn RequestAuthenticator>) -> Self {
        Self {
            registry: Arc::new(registry),
            authenticator,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Authenticate and handle one request, returning the serialized response.
    pub async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Vec<u8>, RequestError> {
        let endpoint = self
            .registry
            .get(path)
            .ok_or_else(|| RequestError::NotFound(path.to_string()))?;

        if method != Method::POST {
            return Err(RequestError::MethodNotAllowed(method.to_string()));
        }

        let inbound = InboundRequest::new(
            header_str(headers, CERT_CHAIN_URL_HEADER),
            header_str(headers, SIGNATURE_HEADER),
            body,
        );
        let request = self
            .authenticator
            .authenticate(inbound, &endpoint.application_id)
            .await?;

        let response = endpoint.handle(&request);
        let bytes = response
            .to_json_bytes()
            .map_err(|e| RequestError::Encode(e.to_string()))?;

        debug!(
            endpoint = %endpoint.name,
            request_type = %request.body.request_type,
            end_session = response.body.should_end_session,
            "Dispatched skill request"
        );
        Ok(bytes)
    }
}

/// Header value as a string; non-UTF-8 values count as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
