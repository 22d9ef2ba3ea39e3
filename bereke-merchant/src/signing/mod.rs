//! Certificate request signing.
//!
//! Production traffic authenticated with a client certificate carries two
//! extra headers computed over the canonical encoded parameter string:
//!
//! - `X-Hash`: base64 of the SHA-256 digest of the string
//! - `X-Signature`: base64 of an RSA PKCS#1 v1.5 signature over that digest
//!
//! The private key lives in a PEM file protected by a passphrase, either the
//! legacy `Proc-Type: 4,ENCRYPTED` PKCS#1 layout or encrypted PKCS#8.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bereke_merchant::signing::{self, HASH_HEADER, SIGNATURE_HEADER};
//!
//! # fn example() -> bereke_merchant::Result<()> {
//! let body = "amount=1050&currency=398&orderNumber=ORD-1";
//! let signature = signing::sign("/etc/bereke/merchant.pem", "passphrase", body)?;
//!
//! println!("{HASH_HEADER}: {}", signature.hash);
//! println!("{SIGNATURE_HEADER}: {}", signature.signature);
//! # Ok(())
//! # }
//! ```

mod signer;
mod verifier;

pub use signer::{
    KeyLoading, RequestSignature, RequestSigner, compute_hash, load_private_key, sign,
};
pub use verifier::verify;

/// Header carrying the base64 SHA-256 digest of the request.
pub const HASH_HEADER: &str = "X-Hash";

/// Header carrying the base64 RSA signature of the digest.
pub const SIGNATURE_HEADER: &str = "X-Signature";
