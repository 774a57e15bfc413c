//! Certificate chain URL rules.
//!
//! Runs before any network access. Scheme and host compare case-insensitively
//! (the URL parser lowercases both); the path prefix compares case-sensitively
//! on the normalized path, so `/echo.api/../x` does not slip through.

use crate::domain::errors::UrlError;
use crate::domain::policy::AuthPolicy;
use url::Url;

/// Validate the value of the `SignatureCertChainUrl` header.
pub fn validate_cert_chain_url(raw: &str, policy: &AuthPolicy) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Unparseable {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(UrlError::Scheme(url.scheme().to_string()));
    }

    let host = url.host_str().unwrap_or_default();
    if !host.eq_ignore_ascii_case(&policy.cert_host) {
        return Err(UrlError::Host {
            expected: policy.cert_host.clone(),
            actual: host.to_string(),
        });
    }

    // An explicit ":443" is normalized away by the parser.
    if let Some(port) = url.port() {
        return Err(UrlError::Port(port));
    }

    if !url.path().starts_with(&policy.cert_path_prefix) {
        return Err(UrlError::Path {
            expected: policy.cert_path_prefix.clone(),
            actual: url.path().to_string(),
        });
    }

    Ok(url)
}
