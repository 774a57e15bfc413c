//! # Authentication Errors
//!
//! One error enum per check, aggregated by [`AuthError`]. Every failure maps to
//! exactly one [`FailureKind`]; the HTTP layer turns that into a status code and
//! never echoes the error text back to the caller.

use thiserror::Error;

/// Failure classes a rejected request falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Unparseable URL, bad base64, bad JSON, bad timestamp, missing header.
    MalformedInput,
    /// The request could be read but is not provably from the platform.
    AuthenticationFailure,
    /// The certificate chain could not be retrieved.
    TransportFailure,
}

/// Certificate chain URL rule violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("unparseable URL {url:?}: {reason}")]
    Unparseable { url: String, reason: String },

    #[error("scheme must be https, got {0:?}")]
    Scheme(String),

    #[error("host must be {expected}, got {actual:?}")]
    Host { expected: String, actual: String },

    #[error("port {0} is not the default https port")]
    Port(u16),

    #[error("path must start with {expected}, got {actual:?}")]
    Path { expected: String, actual: String },
}

/// Certificate bundle retrieval failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("reading body of {url} failed: {reason}")]
    Read { url: String, reason: String },

    #[error("bundle at {url} exceeds {limit} bytes")]
    TooLarge { url: String, limit: usize },
}

/// Certificate chain rejections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("invalid PEM data: {0}")]
    Pem(String),

    #[error("unexpected PEM block {0:?}")]
    UnexpectedPemLabel(String),

    #[error("certificate {index} is not valid X.509: {reason}")]
    Parse { index: usize, reason: String },

    #[error("chain has {0} certificate(s), need leaf plus at least one intermediate")]
    TooShort(usize),

    #[error("certificate {index} is not valid until {not_before}")]
    NotYetValid { index: usize, not_before: i64 },

    #[error("certificate {index} expired at {not_after}")]
    Expired { index: usize, not_after: i64 },

    #[error("leaf certificate has no subject alternative name {0:?}")]
    MissingSubjectAltName(String),

    #[error("no path to a trusted root: {0}")]
    Untrusted(String),

    #[error("leaf public key is not RSA: {0}")]
    UnsupportedKey(String),

    #[error("trust store is unusable: {0}")]
    TrustStore(String),
}

/// Request signature failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header is not valid base64")]
    InvalidBase64,

    #[error("signature does not match request body")]
    Mismatch,
}

/// Request timestamp failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FreshnessError {
    #[error("unparseable timestamp {0:?}")]
    Unparseable(String),

    #[error("timestamp is {age_ms}ms old, limit is {limit_ms}ms")]
    Stale { age_ms: i64, limit_ms: i64 },

    #[error("timestamp is {ahead_ms}ms in the future, limit is {limit_ms}ms")]
    InFuture { ahead_ms: i64, limit_ms: i64 },
}

/// Why the request gate rejected a request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("invalid certificate chain URL: {0}")]
    CertUrl(#[from] UrlError),

    #[error("certificate fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("certificate chain rejected: {0}")]
    Chain(#[from] ChainError),

    #[error("signature rejected: {0}")]
    Signature(#[from] SignatureError),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("timestamp rejected: {0}")]
    Timestamp(#[from] FreshnessError),

    #[error("expected application id {expected:?}, got {actual:?}")]
    ApplicationIdMismatch {
        expected: String,
        actual: Option<String>,
    },

    #[error("request type {0:?} is not recognized")]
    UnrecognizedRequestType(String),
}

impl AuthError {
    /// Classify this failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            AuthError::MissingHeader(_)
            | AuthError::CertUrl(_)
            | AuthError::MalformedBody(_)
            | AuthError::Signature(SignatureError::InvalidBase64)
            | AuthError::Timestamp(FreshnessError::Unparseable(_))
            | AuthError::Chain(ChainError::Pem(_))
            | AuthError::Chain(ChainError::UnexpectedPemLabel(_))
            | AuthError::Chain(ChainError::Parse { .. }) => FailureKind::MalformedInput,

            AuthError::Fetch(_) => FailureKind::TransportFailure,

            AuthError::Chain(_)
            | AuthError::Signature(_)
            | AuthError::Timestamp(_)
            | AuthError::ApplicationIdMismatch { .. }
            | AuthError::UnrecognizedRequestType(_) => FailureKind::AuthenticationFailure,
        }
    }
}
