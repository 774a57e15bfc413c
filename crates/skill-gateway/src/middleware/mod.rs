//! Middleware stack for the skill gateway.
//!
//! Layer order: Request → Tracing → BodyLimit → Handler

pub mod metrics;
pub mod tracing;

pub use self::metrics::{GatewayMetrics, RequestOutcome, RequestTimer};
pub use self::tracing::TracingLayer;
