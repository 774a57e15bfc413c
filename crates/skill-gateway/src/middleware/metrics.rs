//! Request outcome counters, exposed as JSON on `GET /metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// How a skill request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Accepted,
    MalformedInput,
    AuthenticationFailure,
    TransportFailure,
    NotFound,
    MethodNotAllowed,
    PayloadTooLarge,
    Internal,
}

/// Skill gateway metrics
#[derive(Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_accepted: AtomicU64,

    // Rejections by failure class
    pub rejected_malformed: AtomicU64,
    pub rejected_unauthenticated: AtomicU64,
    pub transport_failures: AtomicU64,
    pub not_found: AtomicU64,
    pub method_not_allowed: AtomicU64,
    pub payload_too_large: AtomicU64,
    pub internal_errors: AtomicU64,

    // Latency tracking (simplified - in production use histograms)
    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request
    pub fn record_request(&self, outcome: RequestOutcome, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        let counter = match outcome {
            RequestOutcome::Accepted => &self.requests_accepted,
            RequestOutcome::MalformedInput => &self.rejected_malformed,
            RequestOutcome::AuthenticationFailure => &self.rejected_unauthenticated,
            RequestOutcome::TransportFailure => &self.transport_failures,
            RequestOutcome::NotFound => &self.not_found,
            RequestOutcome::MethodNotAllowed => &self.method_not_allowed,
            RequestOutcome::PayloadTooLarge => &self.payload_too_large,
            RequestOutcome::Internal => &self.internal_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        self.total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "accepted": self.requests_accepted.load(Ordering::Relaxed),
            },
            "rejected": {
                "malformed_input": self.rejected_malformed.load(Ordering::Relaxed),
                "authentication_failure": self.rejected_unauthenticated.load(Ordering::Relaxed),
                "transport_failure": self.transport_failures.load(Ordering::Relaxed),
                "not_found": self.not_found.load(Ordering::Relaxed),
                "method_not_allowed": self.method_not_allowed.load(Ordering::Relaxed),
                "payload_too_large": self.payload_too_large.load(Ordering::Relaxed),
                "internal": self.internal_errors.load(Ordering::Relaxed),
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
        }
    }

    pub fn finish(self, outcome: RequestOutcome) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics.record_request(outcome, latency_ms);
    }
}
