//! # Skill Request Authentication
//!
//! Decides whether an inbound webhook request genuinely originates from the
//! voice-assistant platform.
//!
//! ## Architecture
//!
//! Hexagonal layout:
//! - **Domain Layer** (`domain/`): URL rules, chain validation, signature
//!   verification and freshness checks. Pure CPU work, no I/O.
//! - **Ports Layer** (`ports/`): the `RequestAuthenticator` API and the
//!   `CertificateFetcher` / `TimeSource` dependencies.
//! - **Adapters Layer** (`adapters/`): HTTPS fetcher, URL-keyed cache and the
//!   host trust store loader.
//! - **Service Layer** (`service.rs`): the `RequestGate` running every check in
//!   order and stopping at the first failure.
//!
//! ```text
//! headers + raw body
//!        │
//!        ▼
//!  1. cert URL rules ──► 2. fetch (cache | HTTPS) ──► 3. chain validation
//!                                                         │ leaf RSA key
//!                                                         ▼
//!  7. request type ◄── 6. application id ◄── 5. freshness ◄── 4. signature
//! ```
//!
//! ## Security Notes
//!
//! - The certificate URL is checked before any network call, so the gate
//!   cannot be used as an open fetch proxy.
//! - The signature is computed over the exact bytes received; the body is
//!   decoded only after it verifies.
//! - Cached bundles are re-validated (expiry included) on every use, but cache
//!   entries themselves are never evicted.

#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use adapters::cache::CachingFetcher;
pub use adapters::http_fetcher::HttpCertificateFetcher;
pub use adapters::system_roots::load_system_trust_store;
pub use domain::chain::{validate_chain, CertificateChain, TrustStore};
pub use domain::errors::{
    AuthError, ChainError, FailureKind, FetchError, FreshnessError, SignatureError, UrlError,
};
pub use domain::freshness::check_freshness;
pub use domain::policy::{AuthPolicy, SignatureScheme};
pub use domain::signature::verify_body_signature;
pub use domain::url::validate_cert_chain_url;
pub use ports::inbound::{InboundRequest, RequestAuthenticator};
pub use ports::outbound::{CertificateFetcher, SystemTimeSource, TimeSource};
pub use service::RequestGate;

/// Header carrying the URL of the signing certificate chain.
pub const CERT_CHAIN_URL_HEADER: &str = "SignatureCertChainUrl";
/// Header carrying the base64 request signature.
pub const SIGNATURE_HEADER: &str = "Signature";
