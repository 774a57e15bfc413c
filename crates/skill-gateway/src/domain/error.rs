//! Gateway error types and their HTTP mapping.
//!
//! Callers only ever see the canonical status phrase. The concrete cause is
//! logged server-side by the request handler.

use crate::domain::config::ConfigError;
use crate::domain::endpoint::RegistryError;
use axum::extract::rejection::BytesRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use skill_auth::{AuthError, FailureKind};

/// Gateway-level errors (startup and serving, not per request)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Endpoint registration error
    #[error("registration error: {0}")]
    Registry(#[from] RegistryError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server terminated with an I/O error
    #[error("server error: {0}")]
    Serve(String),
}

/// Why a single skill request was not answered with 200.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("no skill registered at {0}")]
    NotFound(String),

    #[error("method {0} not allowed on skill endpoints")]
    MethodNotAllowed(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("response encoding failed: {0}")]
    Encode(String),
}

impl From<BytesRejection> for RequestError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RequestError::PayloadTooLarge
        } else {
            RequestError::BodyRead(rejection.body_text())
        }
    }
}

impl RequestError {
    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RequestError::Auth(e) => match e.kind() {
                FailureKind::MalformedInput | FailureKind::AuthenticationFailure => {
                    StatusCode::BAD_REQUEST
                }
                FailureKind::TransportFailure => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RequestError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::BodyRead(_) | RequestError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let phrase = status.canonical_reason().unwrap_or("Error");
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{phrase}\n"),
        )
            .into_response()
    }
}
