//! Registered skill endpoints.
//!
//! Endpoints are registered once at startup and are immutable afterwards. The
//! registry is keyed by exact request path.

use skill_types::{SkillRequest, SkillResponse};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Paths served by the gateway itself.
pub const RESERVED_PATHS: &[&str] = &["/health", "/metrics"];

/// Application logic behind an endpoint.
///
/// Called only for requests that passed authentication.
pub trait SkillHandler: Send + Sync {
    fn handle(&self, endpoint: &SkillEndpoint, request: &SkillRequest) -> SkillResponse;
}

impl<F> SkillHandler for F
where
    F: Fn(&SkillEndpoint, &SkillRequest) -> SkillResponse + Send + Sync,
{
    fn handle(&self, endpoint: &SkillEndpoint, request: &SkillRequest) -> SkillResponse {
        self(endpoint, request)
    }
}

/// A path, the application id expected on it, and its handler.
#[derive(Clone)]
pub struct SkillEndpoint {
    pub name: String,
    pub path: String,
    pub application_id: String,
    handler: Arc<dyn SkillHandler>,
}

impl SkillEndpoint {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        application_id: impl Into<String>,
        handler: impl SkillHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            application_id: application_id.into(),
            handler: Arc::new(handler),
        }
    }

    /// Invoke the handler for an authenticated request.
    pub fn handle(&self, request: &SkillRequest) -> SkillResponse {
        self.handler.handle(self, request)
    }
}

impl fmt::Debug for SkillEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillEndpoint")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("application_id", &self.application_id)
            .finish_non_exhaustive()
    }
}

/// Endpoint registration failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("endpoint name cannot be empty (path {0:?})")]
    EmptyName(String),

    #[error("endpoint path {0:?} must start with '/'")]
    InvalidPath(String),

    #[error("endpoint path {0:?} is reserved by the gateway")]
    ReservedPath(String),

    #[error("endpoint {0:?} has an empty application id")]
    EmptyApplicationId(String),

    #[error("an endpoint is already registered at {0:?}")]
    DuplicatePath(String),
}

/// Path → endpoint table.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<String, Arc<SkillEndpoint>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add an endpoint.
    pub fn register(&mut self, endpoint: SkillEndpoint) -> Result<(), RegistryError> {
        if endpoint.name.trim().is_empty() {
            return Err(RegistryError::EmptyName(endpoint.path));
        }
        if !endpoint.path.starts_with('/') {
            return Err(RegistryError::InvalidPath(endpoint.path));
        }
        if RESERVED_PATHS.contains(&endpoint.path.as_str()) {
            return Err(RegistryError::ReservedPath(endpoint.path));
        }
        if endpoint.application_id.trim().is_empty() {
            return Err(RegistryError::EmptyApplicationId(endpoint.path));
        }
        if self.endpoints.contains_key(&endpoint.path) {
            return Err(RegistryError::DuplicatePath(endpoint.path));
        }

        self.endpoints
            .insert(endpoint.path.clone(), Arc::new(endpoint));
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_endpoint(mut self, endpoint: SkillEndpoint) -> Result<Self, RegistryError> {
        self.register(endpoint)?;
        Ok(self)
    }

    pub fn get(&self, path: &str) -> Option<Arc<SkillEndpoint>> {
        self.endpoints.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &SkillEndpoint> {
        self.endpoints.values().map(|e| e.as_ref())
    }
}
