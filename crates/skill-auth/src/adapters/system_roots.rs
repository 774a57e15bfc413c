//! Host trust store.

use crate::domain::chain::TrustStore;
use crate::domain::errors::ChainError;
use tracing::{info, warn};

/// Load the operating system's root certificates.
///
/// Individual unreadable roots are logged and skipped; an empty store is an
/// error.
pub fn load_system_trust_store() -> Result<TrustStore, ChainError> {
    let loaded = rustls_native_certs::load_native_certs();
    for error in &loaded.errors {
        warn!(error = %error, "Failed to load a native root certificate");
    }

    let store = TrustStore::from_der_certs(&loaded.certs)?;
    info!(
        found = loaded.certs.len(),
        usable = store.len(),
        "Loaded system trust store"
    );
    Ok(store)
}
