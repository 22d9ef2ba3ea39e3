//! Bereke Merchant: client for the Bereke Bank merchant payment gateway
//!
//! Builds authenticated requests for the order lifecycle (register,
//! pre-authorize, deposit, refund, reversal, cancel, status query) and decodes
//! the gateway's JSON responses.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ MerchantClient   register / deposit / refund / status ...│
//! └────────┬─────────────────────────────────────────────────┘
//!          │ ToParameters (sparse wire fields, minor units)
//! ┌────────▼─────────────────────────────────────────────────┐
//! │ Dispatcher                                               │
//! │  credentials ─ merge ─ encode (sorted) ─ sign? ─ send    │
//! │                                  │                       │
//! │                     X-Hash + X-Signature (RSA SHA-256),  │
//! │                     certificate auth in production only  │
//! └────────┬─────────────────────────────────────────────────┘
//!          │ Transport (sealed), HttpTransport over reqwest
//! ┌────────▼────────┐
//! │ Payment gateway │  3dsec / securepayments.berekebank.kz
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Register an Order
//!
//! ```rust,no_run
//! use bereke_merchant::{MerchantClient, currency::KZT};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> bereke_merchant::Result<()> {
//! let client = MerchantClient::with_login("merchant-api", "secret", "test")?;
//!
//! let response = client
//!     .register_order_by_number(
//!         "ORD-1001",
//!         Decimal::new(1500, 0),
//!         KZT,
//!         "https://shop.example.kz/paid",
//!         "https://shop.example.kz/failed",
//!     )
//!     .await?;
//! response.response.ensure_success()?;
//!
//! println!("Redirect the customer to {}", response.form_url);
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Query an Order Status
//!
//! ```rust,no_run
//! use bereke_merchant::{MerchantClient, orders::OrderStatusRequest};
//!
//! # async fn example() -> bereke_merchant::Result<()> {
//! let client = MerchantClient::with_token("api-token", "test")?;
//!
//! let status = client.get_order_status(&OrderStatusRequest::by_number("ORD-1001")).await?;
//! println!("{:?} for {}", status.order_status, status.amount()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Load From Configuration
//!
//! ```rust,no_run
//! use bereke_merchant::MerchantClient;
//!
//! # async fn example() -> bereke_merchant::Result<()> {
//! // Secrets are read from the environment variables named in the file.
//! let client = MerchantClient::from_config_file("bereke.toml")?;
//! client.ping().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`currency`]: decimal amount ↔ integer minor unit conversion
//! - [`credentials`]: the three authentication modes
//! - [`signing`]: `X-Hash` / `X-Signature` computation for certificate auth
//! - [`transport`]: sealed transport trait and the reqwest implementation
//! - [`dispatch`]: request composition, signing and decoding
//! - [`orders`]: request and response types of every operation
//! - [`config`]: TOML configuration
//! - [`error`]: error types
//!
//! # Security Considerations
//!
//! - Passwords, tokens and key passphrases are zeroized on drop and never
//!   appear in `Debug` output or logs.
//! - Parameters travel in the query string, so credentials are visible to
//!   anything that logs URLs between client and gateway.
//! - The private key is read per signed request unless
//!   [`KeyLoading::Cached`](signing::KeyLoading::Cached) is selected.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and openssl"
)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod currency;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod orders;
pub mod params;
pub mod signing;
pub mod transport;

pub use client::MerchantClient;
pub use config::GatewayConfig;
pub use credentials::{AuthMode, Credentials};
pub use environment::Environment;
pub use error::{GatewayError, Result};
