//! Transport layer for the gateway HTTP exchange.
//!
//! [`Transport`] is sealed: the only implementation is [`HttpTransport`],
//! built on reqwest. Transports know nothing about credentials or signing;
//! they send a pre-encoded query string plus whatever extra headers the
//! dispatcher hands them, and return the raw response body.
//!
//! Every request carries the two fixed gateway headers:
//!
//! | Header | Value |
//! |--------|-------|
//! | `Accept` | `*/*` |
//! | `Content-Type` | `application/x-www-form-urlencoded` |
//!
//! # Examples
//!
//! ```rust,no_run
//! use bereke_merchant::transport::{HttpMethod, HttpTransport, Transport, TransportRequest};
//!
//! # async fn example() -> bereke_merchant::Result<()> {
//! let transport = HttpTransport::new()?;
//! let response = transport
//!     .send(TransportRequest {
//!         method: HttpMethod::Get,
//!         url: "https://3dsec.berekebank.kz/payment/rest/getOrderStatusExtended.do",
//!         query: "orderNumber=ORD-1&token=secret",
//!         headers: vec![],
//!     })
//!     .await?;
//! println!("status {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;
use std::{fmt, time::Duration};

use crate::error::Result;

pub mod config;
pub mod http;
pub(crate) mod sealed;

pub use config::HttpConfig;
pub use http::HttpTransport;

/// Value of the `Accept` header sent with every request.
pub const ACCEPT_VALUE: &str = "*/*";

/// Value of the `Content-Type` header sent with every request.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method of a gateway endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl HttpMethod {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing gateway request.
#[derive(Debug, Clone)]
pub struct TransportRequest<'a> {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute endpoint URL without a query string.
    pub url: &'a str,
    /// Already-encoded query string, sent verbatim (may be empty).
    pub query: &'a str,
    /// Extra headers on top of the fixed gateway headers.
    pub headers: Vec<(&'static str, &'a str)>,
}

/// Raw gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code. Not interpreted; the gateway reports failures in the body.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
}

/// Transport protocol abstraction.
///
/// This trait is sealed; only implementations within this crate are allowed.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Sends one request and reads the whole response body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`](crate::GatewayError::Transport) on
    /// any network failure.
    fn send<'a>(
        &'a self,
        request: TransportRequest<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Issues a bare `GET` to `url` bounded by `timeout`.
    ///
    /// Any HTTP response counts as reachable.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unreachable`](crate::GatewayError::Unreachable)
    /// if no response arrives in time.
    fn probe<'a>(
        &'a self,
        url: &'a str,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}
