//! # Certificate Chain Validation
//!
//! A bundle is a PEM file holding the signing (leaf) certificate followed by
//! one or more intermediates. It is accepted when:
//!
//! 1. Every block is a `CERTIFICATE` that parses as X.509.
//! 2. There are at least two certificates.
//! 3. Every certificate is inside its validity window at the reference time
//!    (both bounds inclusive, whole seconds).
//! 4. The leaf carries the service identity as a DNS subject alternative name.
//! 5. The chain builds to a root in the host trust store.
//!
//! The leaf's RSA public key is returned for signature verification.

use crate::domain::errors::ChainError;
use crate::domain::policy::AuthPolicy;
use chrono::{DateTime, Utc};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use rustls_pki_types::{CertificateDer, TrustAnchor, UnixTime};
use std::time::Duration;
use tracing::debug;
use webpki::{EndEntityCert, KeyUsage};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::pem::Pem;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Root certificates a chain must build to.
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    anchors: Vec<TrustAnchor<'static>>,
}

impl TrustStore {
    /// Build a store from DER-encoded root certificates.
    ///
    /// Certificates webpki cannot use as anchors are skipped; an empty result
    /// is an error.
    pub fn from_der_certs(certs: &[CertificateDer<'_>]) -> Result<Self, ChainError> {
        let mut anchors = Vec::new();
        let mut skipped = 0usize;
        for der in certs {
            match webpki::anchor_from_trusted_cert(der) {
                Ok(anchor) => anchors.push(anchor.to_owned()),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "Ignored root certificates webpki cannot use");
        }
        if anchors.is_empty() {
            return Err(ChainError::TrustStore("no usable root certificates".into()));
        }
        Ok(Self { anchors })
    }

    /// Build a store from a PEM bundle of root certificates.
    pub fn from_pem(pem: &[u8]) -> Result<Self, ChainError> {
        let chain = CertificateChain::parse_blocks(pem)?;
        Self::from_der_certs(&chain.certs)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub(crate) fn anchors(&self) -> &[TrustAnchor<'static>] {
        &self.anchors
    }
}

/// DER certificates decoded from a PEM bundle, leaf first.
#[derive(Debug, Clone)]
pub struct CertificateChain {
    certs: Vec<CertificateDer<'static>>,
}

impl CertificateChain {
    /// Decode a bundle and enforce the minimum chain length.
    pub fn parse_pem(pem: &[u8]) -> Result<Self, ChainError> {
        let chain = Self::parse_blocks(pem)?;
        if chain.certs.len() < 2 {
            return Err(ChainError::TooShort(chain.certs.len()));
        }
        Ok(chain)
    }

    fn parse_blocks(pem: &[u8]) -> Result<Self, ChainError> {
        let mut certs = Vec::new();
        for block in Pem::iter_from_buffer(pem) {
            let block = block.map_err(|e| ChainError::Pem(e.to_string()))?;
            if block.label != CERTIFICATE_LABEL {
                return Err(ChainError::UnexpectedPemLabel(block.label));
            }
            certs.push(CertificateDer::from(block.contents));
        }
        if certs.is_empty() {
            return Err(ChainError::Pem("no PEM blocks found".into()));
        }
        Ok(Self { certs })
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn leaf(&self) -> &CertificateDer<'static> {
        &self.certs[0]
    }

    pub fn intermediates(&self) -> &[CertificateDer<'static>] {
        &self.certs[1..]
    }
}

/// Validate a PEM bundle and return the leaf's RSA public key.
pub fn validate_chain(
    pem: &[u8],
    trust_store: &TrustStore,
    policy: &AuthPolicy,
    now: DateTime<Utc>,
) -> Result<RsaPublicKey, ChainError> {
    let chain = CertificateChain::parse_pem(pem)?;

    let parsed = chain
        .certs
        .iter()
        .enumerate()
        .map(|(index, der)| {
            x509_parser::parse_x509_certificate(der.as_ref())
                .map(|(_, cert)| cert)
                .map_err(|e| ChainError::Parse {
                    index,
                    reason: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let now_secs = now.timestamp();
    for (index, cert) in parsed.iter().enumerate() {
        check_validity(index, cert, now_secs)?;
    }

    let leaf = &parsed[0];
    check_service_identity(leaf, &policy.service_identity)?;
    verify_path(&chain, trust_store, now_secs)?;

    RsaPublicKey::from_public_key_der(leaf.public_key().raw)
        .map_err(|e| ChainError::UnsupportedKey(e.to_string()))
}

fn check_validity(index: usize, cert: &X509Certificate<'_>, now: i64) -> Result<(), ChainError> {
    let validity = cert.validity();
    let not_before = validity.not_before.timestamp();
    let not_after = validity.not_after.timestamp();
    if now < not_before {
        return Err(ChainError::NotYetValid { index, not_before });
    }
    if now > not_after {
        return Err(ChainError::Expired { index, not_after });
    }
    Ok(())
}

fn check_service_identity(leaf: &X509Certificate<'_>, identity: &str) -> Result<(), ChainError> {
    let san = leaf
        .subject_alternative_name()
        .map_err(|e| ChainError::Parse {
            index: 0,
            reason: e.to_string(),
        })?;

    let found = san.is_some_and(|ext| {
        ext.value
            .general_names
            .iter()
            .any(|name| matches!(name, GeneralName::DNSName(dns) if *dns == identity))
    });

    if found {
        Ok(())
    } else {
        Err(ChainError::MissingSubjectAltName(identity.to_string()))
    }
}

fn verify_path(chain: &CertificateChain, trust_store: &TrustStore, now: i64) -> Result<(), ChainError> {
    let end_entity =
        EndEntityCert::try_from(chain.leaf()).map_err(|e| ChainError::Untrusted(e.to_string()))?;

    // Validity windows were checked above; a negative clock is clamped.
    let time = UnixTime::since_unix_epoch(Duration::from_secs(now.max(0) as u64));

    end_entity
        .verify_for_usage(
            webpki::ALL_VERIFICATION_ALGS,
            trust_store.anchors(),
            chain.intermediates(),
            time,
            KeyUsage::server_auth(),
            None,
            None,
        )
        .map(|_| ())
        .map_err(|e| ChainError::Untrusted(format!("{e:?}")))
}
