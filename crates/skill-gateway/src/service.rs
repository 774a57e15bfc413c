//! Skill gateway service - HTTP entry point.
//!
//! Routes:
//! - `GET /health`: liveness probe (when enabled)
//! - `GET /metrics`: request counters as JSON
//! - anything else: skill dispatch by exact path

use crate::dispatcher::Dispatcher;
use crate::domain::config::GatewayConfig;
use crate::domain::endpoint::EndpointRegistry;
use crate::domain::error::{GatewayError, RequestError};
use crate::middleware::{GatewayMetrics, RequestOutcome, RequestTimer, TracingLayer};
use crate::SKILL_RESPONSE_CONTENT_TYPE;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use skill_auth::{FailureKind, RequestAuthenticator};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Skill gateway service state
pub struct SkillGatewayService {
    config: GatewayConfig,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<GatewayMetrics>,
}

impl SkillGatewayService {
    /// Create a new gateway over a populated registry.
    pub fn new(
        config: GatewayConfig,
        registry: EndpointRegistry,
        authenticator: Arc<dyn RequestAuthenticator>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        if registry.is_empty() {
            warn!("No skill endpoints registered; every skill request will 404");
        }
        for endpoint in registry.endpoints() {
            info!(name = %endpoint.name, path = %endpoint.path, "Registered skill endpoint");
        }

        Ok(Self {
            config,
            dispatcher: Arc::new(Dispatcher::new(registry, authenticator)),
            metrics: Arc::new(GatewayMetrics::new()),
        })
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let state = AppState {
            dispatcher: Arc::clone(&self.dispatcher),
            metrics: Arc::clone(&self.metrics),
        };

        let mut router = Router::new().route("/metrics", get(metrics_report));
        if self.config.http.health_enabled {
            router = router.route("/health", get(health_check));
        }

        router
            .fallback(handle_skill_request)
            .layer(DefaultBodyLimit::max(self.config.limits.max_request_size))
            .layer(TracingLayer::new())
            .with_state(state)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;

        let local = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %local, "Skill gateway listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server error");
                GatewayError::Serve(e.to_string())
            })?;

        info!("Skill gateway stopped");
        Ok(())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<GatewayMetrics>,
}

/// Authenticate, dispatch and answer one skill request.
async fn handle_skill_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let timer = RequestTimer::new(Arc::clone(&state.metrics));
    let path = uri.path();

    let result = match body {
        Ok(body) => state.dispatcher.dispatch(&method, path, &headers, &body).await,
        Err(rejection) => Err(RequestError::from(rejection)),
    };

    match result {
        Ok(bytes) => {
            timer.finish(RequestOutcome::Accepted);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, SKILL_RESPONSE_CONTENT_TYPE)],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                error!(path, status = %status, error = %err, "Skill request failed");
            } else {
                warn!(path, status = %status, error = %err, "Skill request rejected");
            }
            timer.finish(outcome(&err));
            err.into_response()
        }
    }
}

fn outcome(err: &RequestError) -> RequestOutcome {
    match err {
        RequestError::NotFound(_) => RequestOutcome::NotFound,
        RequestError::MethodNotAllowed(_) => RequestOutcome::MethodNotAllowed,
        RequestError::Auth(e) => match e.kind() {
            FailureKind::MalformedInput => RequestOutcome::MalformedInput,
            FailureKind::AuthenticationFailure => RequestOutcome::AuthenticationFailure,
            FailureKind::TransportFailure => RequestOutcome::TransportFailure,
        },
        RequestError::PayloadTooLarge => RequestOutcome::PayloadTooLarge,
        RequestError::BodyRead(_) => RequestOutcome::TransportFailure,
        RequestError::Encode(_) => RequestOutcome::Internal,
    }
}

async fn metrics_report(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.to_json())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "skill-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
