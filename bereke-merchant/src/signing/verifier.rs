//! Signature verification against a public key.

use base64::{Engine, engine::general_purpose::STANDARD};
use openssl::{hash::MessageDigest, pkey::PKey, sign::Verifier};

use crate::error::{GatewayError, Result};

/// Checks an `X-Signature` value against `body` and a PEM public key.
///
/// Returns `Ok(false)` when the signature does not match `body` under the
/// key.
///
/// # Errors
///
/// Returns [`GatewayError::Signing`] if the public key cannot be parsed, the
/// signature is not valid base64, or OpenSSL fails to run the verification.
pub fn verify(public_key_pem: &[u8], body: &[u8], signature: &str) -> Result<bool> {
    let public_key = PKey::public_key_from_pem(public_key_pem)
        .map_err(|e| GatewayError::Signing(format!("invalid public key: {e}")))?;
    let signature = STANDARD
        .decode(signature)
        .map_err(|e| GatewayError::Signing(format!("signature is not base64: {e}")))?;

    let mut verifier = Verifier::new(MessageDigest::sha256(), &public_key)
        .map_err(|e| GatewayError::Signing(e.to_string()))?;
    verifier.update(body).map_err(|e| GatewayError::Signing(e.to_string()))?;

    // A mismatch, bad padding included, comes back as Ok(false); only
    // failures of the verification itself are errors.
    verifier.verify(&signature).map_err(|e| GatewayError::Signing(e.to_string()))
}
