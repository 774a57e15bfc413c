//! Request body signature verification.

use crate::domain::errors::SignatureError;
use crate::domain::policy::SignatureScheme;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Verify `signature_b64` over the exact bytes of `body`.
///
/// The body is hashed as received; nothing is re-serialized or trimmed.
pub fn verify_body_signature(
    key: &RsaPublicKey,
    signature_b64: &str,
    body: &[u8],
    scheme: SignatureScheme,
) -> Result<(), SignatureError> {
    let signature = STANDARD
        .decode(signature_b64.trim())
        .map_err(|_| SignatureError::InvalidBase64)?;

    let result = match scheme {
        SignatureScheme::RsaPkcs1v15Sha1 => key.verify(
            Pkcs1v15Sign::new::<Sha1>(),
            &Sha1::digest(body),
            &signature,
        ),
        SignatureScheme::RsaPkcs1v15Sha256 => key.verify(
            Pkcs1v15Sign::new::<Sha256>(),
            &Sha256::digest(body),
            &signature,
        ),
    };

    result.map_err(|_| SignatureError::Mismatch)
}
