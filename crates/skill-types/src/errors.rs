//! Envelope encoding errors.

use thiserror::Error;

/// Failure to decode or encode an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The bytes are not a JSON document matching the envelope schema.
    #[error("malformed envelope: {0}")]
    Decode(#[source] serde_json::Error),

    /// The envelope could not be serialized.
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] serde_json::Error),
}
