//! # Skill Gateway
//!
//! HTTP front end for voice-assistant skills. Each registered endpoint owns a
//! URL path and an application id; requests are authenticated by a
//! [`skill_auth::RequestAuthenticator`] before the endpoint's handler runs.
//!
//! ```text
//! POST /skills/hello
//!        │
//!  ┌─────┴──────────────────────────────┐
//!  │ Middleware: Tracing → BodyLimit    │
//!  └─────┬──────────────────────────────┘
//!        ▼
//!  registry lookup ──► authenticate ──► handler ──► JSON response
//!   (404 / 405)         (400 / 500)                   (200)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use skill_gateway::{EndpointRegistry, GatewayConfig, SkillEndpoint, SkillGatewayService};
//!
//! let registry = EndpointRegistry::new().with_endpoint(SkillEndpoint::new(
//!     "hello", "/skills/hello", app_id, handler,
//! ))?;
//! let service = SkillGatewayService::new(GatewayConfig::default(), registry, gate)?;
//! service.start(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod dispatcher;
pub mod domain;
pub mod middleware;
pub mod service;

// Re-exports for public API
pub use dispatcher::Dispatcher;
pub use domain::config::{ConfigError, GatewayConfig, HttpConfig, LimitsConfig};
pub use domain::endpoint::{EndpointRegistry, RegistryError, SkillEndpoint, SkillHandler};
pub use domain::error::{GatewayError, RequestError};
pub use middleware::{GatewayMetrics, RequestOutcome};
pub use service::SkillGatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Content type of every successful skill response.
pub const SKILL_RESPONSE_CONTENT_TYPE: &str = "application/json; charset=utf-8";
