//! Authentication policy: the platform constants the gate enforces.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Host serving the platform's signing certificate bundles.
pub const DEFAULT_CERT_HOST: &str = "s3.amazonaws.com";
/// Case-sensitive path prefix every bundle URL must start with.
pub const DEFAULT_CERT_PATH_PREFIX: &str = "/echo.api/";
/// Subject alternative name the signing certificate must carry.
pub const DEFAULT_SERVICE_IDENTITY: &str = "echo-api.amazon.com";

/// Hash and padding used for the request signature.
///
/// The platform mandates RSA PKCS#1 v1.5 over SHA-1. SHA-256 is accepted as a
/// configuration value for newer contract revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureScheme {
    #[default]
    RsaPkcs1v15Sha1,
    RsaPkcs1v15Sha256,
}

/// Everything the request gate checks against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPolicy {
    pub cert_host: String,
    pub cert_path_prefix: String,
    pub service_identity: String,
    /// Oldest request timestamp accepted. A timestamp exactly this old passes.
    #[serde(with = "humantime_serde")]
    pub max_timestamp_age: Duration,
    /// How far in the future a timestamp may be. `None` accepts any future
    /// timestamp, which is the platform's documented behaviour.
    #[serde(with = "humantime_serde::option")]
    pub max_future_skew: Option<Duration>,
    pub signature_scheme: SignatureScheme,
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
    /// Largest certificate bundle the fetcher will accept.
    pub max_chain_bytes: usize,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            cert_host: DEFAULT_CERT_HOST.to_string(),
            cert_path_prefix: DEFAULT_CERT_PATH_PREFIX.to_string(),
            service_identity: DEFAULT_SERVICE_IDENTITY.to_string(),
            max_timestamp_age: Duration::from_secs(30),
            max_future_skew: None,
            signature_scheme: SignatureScheme::default(),
            fetch_timeout: Duration::from_secs(10),
            max_chain_bytes: 64 * 1024,
        }
    }
}

impl AuthPolicy {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.cert_host.is_empty() {
            return Err("cert_host cannot be empty".into());
        }
        if !self.cert_path_prefix.starts_with('/') {
            return Err("cert_path_prefix must start with '/'".into());
        }
        if self.service_identity.is_empty() {
            return Err("service_identity cannot be empty".into());
        }
        if self.max_timestamp_age.is_zero() {
            return Err("max_timestamp_age cannot be 0".into());
        }
        if self.fetch_timeout.is_zero() {
            return Err("fetch_timeout cannot be 0".into());
        }
        if self.max_chain_bytes == 0 {
            return Err("max_chain_bytes cannot be 0".into());
        }
        Ok(())
    }
}

/// Duration (de)serialization as `"30s"`, `"500ms"` or `"2m"`.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn format_duration(duration: &Duration) -> String {
        if duration.subsec_millis() != 0 {
            format!("{}ms", duration.as_millis())
        } else {
            format!("{}s", duration.as_secs())
        }
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s", otherwise "500ms" parses as "500m" + "s".
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
