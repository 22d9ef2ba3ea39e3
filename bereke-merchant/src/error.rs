//! Error types for the Bereke merchant gateway client.
//!
//! Every fallible operation in this crate returns [`GatewayError`] through the
//! [`Result`] alias. Errors are always handed back to the immediate caller;
//! nothing is retried or logged on the caller's behalf.
//!
//! # Error Categories
//!
//! - **Configuration** ([`GatewayError::InvalidEnvironment`],
//!   [`GatewayError::InvalidConfig`]): the client could not be constructed
//! - **Input** ([`GatewayError::InvalidInput`], [`GatewayError::UnsupportedCurrency`],
//!   [`GatewayError::AmountOutOfRange`]): a request was rejected before any I/O
//! - **Key material** ([`GatewayError::KeyLoad`], [`GatewayError::Signing`]): certificate
//!   signing failed, the call was aborted before any network traffic
//! - **Network** ([`GatewayError::Transport`], [`GatewayError::DeadlineExceeded`],
//!   [`GatewayError::Unreachable`]): the HTTP exchange did not complete
//! - **Protocol** ([`GatewayError::Decode`], [`GatewayError::Rejected`]): the gateway
//!   answered with something unusable, or with a business error the caller chose to
//!   escalate
//!
//! # Examples
//!
//! ```
//! use bereke_merchant::{
//!     currency,
//!     error::{GatewayError, Result},
//! };
//! use rust_decimal::Decimal;
//!
//! fn minor(amount: Decimal) -> Result<i64> {
//!     currency::to_minor_unit(amount, 398)
//! }
//!
//! let err = currency::to_minor_unit(Decimal::ONE, 1).unwrap_err();
//! assert!(matches!(err, GatewayError::UnsupportedCurrency(1)));
//! assert_eq!(minor(Decimal::ONE).unwrap(), 100);
//! ```

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the merchant gateway.
///
/// A gateway-level business failure (non-zero `errorCode`) is *not* an error
/// by default: it arrives as data inside the decoded response. Callers that
/// prefer to treat it as a failure use
/// [`GatewayResponse::ensure_success`](crate::orders::GatewayResponse::ensure_success),
/// which produces [`GatewayError::Rejected`].
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Environment text was neither `test` nor `production`.
    ///
    /// Raised at client construction; no client is produced.
    #[error("invalid environment: {0:?} (expected \"test\" or \"production\")")]
    InvalidEnvironment(String),

    /// Configuration file or values are invalid.
    ///
    /// Covers TOML syntax errors, out-of-range timeouts, malformed base URL
    /// overrides and secrets missing from the process environment.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request input rejected before dispatch.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Currency code is not present in the currency table.
    ///
    /// # Recovery
    ///
    /// Use one of the codes listed by [`crate::currency::supported`].
    #[error("unsupported currency code: {0}")]
    UnsupportedCurrency(u16),

    /// Amount does not fit into a 64-bit count of minor units.
    #[error("amount {amount} is out of range for currency {code}")]
    AmountOutOfRange {
        /// Decimal amount as text.
        amount: String,
        /// Numeric currency code.
        code: u16,
    },

    /// Private key could not be loaded.
    ///
    /// Common causes include:
    /// - Missing or unreadable key file
    /// - Malformed PEM block
    /// - Wrong passphrase
    /// - Key is not an RSA key
    ///
    /// The failing request is never sent.
    #[error("failed to load signing key from {}: {reason}", path.display())]
    KeyLoad {
        /// Path of the key file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Signature computation failed with a loaded key.
    #[error("request signing failed: {0}")]
    Signing(String),

    /// HTTP exchange failed.
    ///
    /// Wraps [`reqwest::Error`] unchanged: connection refused, DNS failures,
    /// TLS errors and client-level timeouts all land here.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Per-call deadline elapsed before the gateway answered.
    #[error("gateway did not respond within {0:?}")]
    DeadlineExceeded(Duration),

    /// Liveness probe could not reach the gateway.
    #[error("server is unreachable: {url}")]
    Unreachable {
        /// Probed URL.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// Response body is not valid JSON for the expected shape.
    ///
    /// Empty bodies never produce this error.
    #[error("failed to decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Gateway answered with a non-zero `errorCode`.
    ///
    /// Only produced on request, see
    /// [`GatewayResponse::ensure_success`](crate::orders::GatewayResponse::ensure_success).
    #[error("gateway rejected request with code {code}: {message}")]
    Rejected {
        /// Gateway `errorCode`.
        code: i32,
        /// Gateway `errorMessage`.
        message: String,
    },
}

impl GatewayError {
    /// Returns true for failures that happened on the network path.
    ///
    /// Useful for callers that implement their own retry policy; this crate
    /// never retries.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::DeadlineExceeded(_) | Self::Unreachable { .. }
        )
    }
}
