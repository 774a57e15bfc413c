//! Replay window on the request timestamp.

use crate::domain::errors::FreshnessError;
use crate::domain::policy::AuthPolicy;
use chrono::{DateTime, Duration, Utc};

/// Check an RFC 3339 timestamp against `now`.
///
/// A timestamp exactly `max_timestamp_age` old is accepted. Future timestamps
/// are accepted unless `max_future_skew` is configured.
pub fn check_freshness(
    timestamp: &str,
    now: DateTime<Utc>,
    policy: &AuthPolicy,
) -> Result<(), FreshnessError> {
    let ts = DateTime::parse_from_rfc3339(timestamp.trim())
        .map_err(|_| FreshnessError::Unparseable(timestamp.to_string()))?
        .with_timezone(&Utc);

    let age = now - ts;
    if age > delta(policy.max_timestamp_age) {
        return Err(FreshnessError::Stale {
            age_ms: age.num_milliseconds(),
            limit_ms: millis(policy.max_timestamp_age),
        });
    }

    if let Some(skew) = policy.max_future_skew {
        let ahead = -age;
        if ahead > delta(skew) {
            return Err(FreshnessError::InFuture {
                ahead_ms: ahead.num_milliseconds(),
                limit_ms: millis(skew),
            });
        }
    }

    Ok(())
}

fn delta(d: std::time::Duration) -> Duration {
    Duration::from_std(d).unwrap_or(Duration::MAX)
}

fn millis(d: std::time::Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
