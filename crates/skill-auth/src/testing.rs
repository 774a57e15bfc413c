//! Test fixtures: a throwaway PKI, a fixed clock and a counting fetcher.
//!
//! The PKI mirrors the platform's layout: an ECDSA root (the trust anchor), an
//! ECDSA intermediate, and an RSA-2048 leaf carrying the service identity as
//! its subject alternative name. It is generated once per test binary.
//!
//! Compiled for this crate's tests and behind the `test-support` feature.

use crate::domain::chain::TrustStore;
use crate::domain::errors::FetchError;
use crate::domain::policy::{AuthPolicy, SignatureScheme, DEFAULT_SERVICE_IDENTITY};
use crate::ports::outbound::{CertificateFetcher, TimeSource};
use crate::service::RequestGate;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose,
};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// A certificate URL that satisfies the default URL rules.
pub const TEST_CERT_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert.pem";
/// Application id used by the fixture requests.
pub const TEST_APP_ID: &str = "amzn1.ask.skill.0f3c2a1e-test";

/// Fixed instant inside every fixture certificate's validity window.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .expect("valid reference time")
}

/// Certificates and keys of the fixture PKI, as PEM.
pub struct TestPki {
    root_pem: String,
    intermediate_pem: String,
    leaf_pem: String,
    expired_leaf_pem: String,
    future_leaf_pem: String,
    wrong_identity_leaf_pem: String,
    ecdsa_leaf_pem: String,
    untrusted_chain_pem: String,
    leaf_key: RsaPrivateKey,
}

/// The shared fixture PKI.
pub fn test_pki() -> &'static TestPki {
    static PKI: OnceLock<TestPki> = OnceLock::new();
    PKI.get_or_init(TestPki::generate)
}

struct Issuer {
    cert: Certificate,
    key: KeyPair,
}

impl TestPki {
    fn generate() -> Self {
        let leaf_key =
            RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("generate RSA leaf key");
        let leaf_key_pem = leaf_key
            .to_pkcs8_pem(LineEnding::LF)
            .expect("encode RSA leaf key");
        let rsa_leaf = || {
            KeyPair::from_pem_and_sign_algo(&leaf_key_pem, &rcgen::PKCS_RSA_SHA256)
                .expect("load RSA leaf key")
        };

        let root = self_signed_root("Test Root CA");
        let intermediate = intermediate_ca("Test Intermediate CA", &root);

        let valid = (2020, 2099);
        let leaf = leaf_cert(DEFAULT_SERVICE_IDENTITY, &rsa_leaf(), &intermediate, valid);
        let expired_leaf = leaf_cert(DEFAULT_SERVICE_IDENTITY, &rsa_leaf(), &intermediate, (2019, 2021));
        let future_leaf = leaf_cert(DEFAULT_SERVICE_IDENTITY, &rsa_leaf(), &intermediate, (2030, 2040));
        let wrong_identity_leaf = leaf_cert("evil.example.com", &rsa_leaf(), &intermediate, valid);
        let ecdsa_key = KeyPair::generate().expect("generate ECDSA leaf key");
        let ecdsa_leaf = leaf_cert(DEFAULT_SERVICE_IDENTITY, &ecdsa_key, &intermediate, valid);

        let rogue_root = self_signed_root("Rogue Root CA");
        let rogue_intermediate = intermediate_ca("Rogue Intermediate CA", &rogue_root);
        let rogue_leaf = leaf_cert(DEFAULT_SERVICE_IDENTITY, &rsa_leaf(), &rogue_intermediate, valid);

        Self {
            root_pem: root.cert.pem(),
            intermediate_pem: intermediate.cert.pem(),
            leaf_pem: leaf.pem(),
            expired_leaf_pem: expired_leaf.pem(),
            future_leaf_pem: future_leaf.pem(),
            wrong_identity_leaf_pem: wrong_identity_leaf.pem(),
            ecdsa_leaf_pem: ecdsa_leaf.pem(),
            untrusted_chain_pem: format!("{}{}", rogue_leaf.pem(), rogue_intermediate.cert.pem()),
            leaf_key,
        }
    }

    pub fn root_pem(&self) -> &str {
        &self.root_pem
    }

    pub fn leaf_pem(&self) -> &str {
        &self.leaf_pem
    }

    /// Trust store holding only the fixture root.
    pub fn trust_store(&self) -> TrustStore {
        TrustStore::from_pem(self.root_pem.as_bytes()).expect("fixture root is a usable anchor")
    }

    /// Leaf followed by the intermediate, as the platform serves it.
    pub fn chain_pem(&self) -> Vec<u8> {
        self.with_intermediate(&self.leaf_pem)
    }

    pub fn expired_chain_pem(&self) -> Vec<u8> {
        self.with_intermediate(&self.expired_leaf_pem)
    }

    pub fn future_chain_pem(&self) -> Vec<u8> {
        self.with_intermediate(&self.future_leaf_pem)
    }

    pub fn wrong_identity_chain_pem(&self) -> Vec<u8> {
        self.with_intermediate(&self.wrong_identity_leaf_pem)
    }

    pub fn ecdsa_leaf_chain_pem(&self) -> Vec<u8> {
        self.with_intermediate(&self.ecdsa_leaf_pem)
    }

    /// A well-formed chain ending at a root the trust store does not hold.
    pub fn untrusted_chain_pem(&self) -> Vec<u8> {
        self.untrusted_chain_pem.clone().into_bytes()
    }

    pub fn leaf_public_key(&self) -> RsaPublicKey {
        self.leaf_key.to_public_key()
    }

    /// Sign `body` the way the platform does (RSA PKCS#1 v1.5 over SHA-1).
    pub fn sign(&self, body: &[u8]) -> String {
        self.sign_with(body, SignatureScheme::RsaPkcs1v15Sha1)
    }

    pub fn sign_with(&self, body: &[u8], scheme: SignatureScheme) -> String {
        let signature = match scheme {
            SignatureScheme::RsaPkcs1v15Sha1 => self
                .leaf_key
                .sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(body)),
            SignatureScheme::RsaPkcs1v15Sha256 => self
                .leaf_key
                .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(body)),
        }
        .expect("sign fixture body");
        STANDARD.encode(signature)
    }

    fn with_intermediate(&self, leaf_pem: &str) -> Vec<u8> {
        format!("{leaf_pem}{}", self.intermediate_pem).into_bytes()
    }
}

fn ca_params(common_name: &str) -> CertificateParams {
    let mut params = CertificateParams::default();
    params.distinguished_name.push(DnType::CommonName, common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.key_usages = vec![
        KeyUsagePurpose::KeyCertSign,
        KeyUsagePurpose::CrlSign,
        KeyUsagePurpose::DigitalSignature,
    ];
    params.not_before = rcgen::date_time_ymd(2015, 1, 1);
    params.not_after = rcgen::date_time_ymd(2100, 1, 1);
    params
}

fn self_signed_root(common_name: &str) -> Issuer {
    let key = KeyPair::generate().expect("generate root key");
    let cert = ca_params(common_name)
        .self_signed(&key)
        .expect("self-sign root");
    Issuer { cert, key }
}

fn intermediate_ca(common_name: &str, issuer: &Issuer) -> Issuer {
    let key = KeyPair::generate().expect("generate intermediate key");
    let cert = ca_params(common_name)
        .signed_by(&key, &issuer.cert, &issuer.key)
        .expect("sign intermediate");
    Issuer { cert, key }
}

fn leaf_cert(identity: &str, key: &KeyPair, issuer: &Issuer, years: (i32, i32)) -> Certificate {
    let mut params =
        CertificateParams::new(vec![identity.to_string()]).expect("leaf subject alt name");
    params.distinguished_name.push(DnType::CommonName, identity);
    params.is_ca = IsCa::ExplicitNoCa;
    params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    params.not_before = rcgen::date_time_ymd(years.0, 1, 1);
    params.not_after = rcgen::date_time_ymd(years.1, 1, 1);
    params
        .signed_by(key, &issuer.cert, &issuer.key)
        .expect("sign leaf")
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub DateTime<Utc>);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Fetcher returning a canned result and counting its calls.
pub struct CountingFetcher {
    response: Result<Bytes, FetchError>,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(bundle: Bytes) -> Self {
        Self {
            response: Ok(bundle),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serves the fixture PKI's valid chain.
    pub fn with_chain() -> Self {
        Self::new(Bytes::from(test_pki().chain_pem()))
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateFetcher for CountingFetcher {
    async fn fetch(&self, _url: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Gate over `fetcher`, trusting the fixture root, frozen at [`reference_time`].
pub fn test_gate(fetcher: Arc<dyn CertificateFetcher>) -> RequestGate {
    RequestGate::new(fetcher, test_pki().trust_store(), AuthPolicy::default())
        .with_clock(Arc::new(FixedTimeSource(reference_time())))
}

/// A request envelope of the given type, serialized compactly.
pub fn request_json(request_type: &str, application_id: &str, timestamp: DateTime<Utc>) -> String {
    serde_json::json!({
        "version": "1.0",
        "session": {
            "new": true,
            "sessionId": "amzn1.echo-api.session.0001",
            "application": { "applicationId": application_id },
            "attributes": {},
            "user": { "userId": "amzn1.account.TESTUSER" }
        },
        "request": {
            "type": request_type,
            "requestId": "amzn1.echo-api.request.0001",
            "timestamp": timestamp.to_rfc3339()
        }
    })
    .to_string()
}

pub fn launch_request_json(application_id: &str, timestamp: DateTime<Utc>) -> String {
    request_json("LaunchRequest", application_id, timestamp)
}

pub fn intent_request_json(application_id: &str, intent: &str, timestamp: DateTime<Utc>) -> String {
    let mut value: serde_json::Value = serde_json::from_str(&request_json(
        "IntentRequest",
        application_id,
        timestamp,
    ))
    .expect("fixture request is valid JSON");
    value["request"]["intent"] = serde_json::json!({ "name": intent, "slots": {} });
    value.to_string()
}

pub fn session_ended_request_json(
    application_id: &str,
    reason: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let mut value: serde_json::Value = serde_json::from_str(&request_json(
        "SessionEndedRequest",
        application_id,
        timestamp,
    ))
    .expect("fixture request is valid JSON");
    value["request"]["reason"] = serde_json::json!(reason);
    value.to_string()
}
