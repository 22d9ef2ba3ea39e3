//! Order lifecycle operations.
//!
//! Each gateway operation is a fixed `(path, method, request, response)`
//! tuple:
//!
//! | Operation | Path | Method | Response |
//! |-----------|------|--------|----------|
//! | [`Operation::Register`] | `register.do` | POST | [`RegisterOrderResponse`] |
//! | [`Operation::PreAuth`] | `registerPreAuth.do` | POST | [`RegisterOrderResponse`] |
//! | [`Operation::Deposit`] | `deposit.do` | POST | [`GatewayResponse`] |
//! | [`Operation::Refund`] | `refund.do` | POST | [`GatewayResponse`] |
//! | [`Operation::Reversal`] | `reverse.do` | POST | [`GatewayResponse`] |
//! | [`Operation::Cancel`] | `decline.do` | POST | [`GatewayResponse`] |
//! | [`Operation::Status`] | `getOrderStatusExtended.do` | GET | [`OrderStatusResponse`] |
//!
//! The operations themselves are methods on
//! [`MerchantClient`](crate::MerchantClient).

use crate::transport::HttpMethod;

mod models;
mod operations;
mod response;

pub use models::{
    CancelOrderRequest, DepositOrderRequest, EXPIRATION_DATE_FORMAT, OrderStatusRequest,
    PaymentFeature, RefundOrderRequest, RegisterOrderRequest, ReversalOrderRequest,
};
pub use response::{
    BankInfo, BindingInfo, CardAuthInfo, GatewayResponse, OrderStatus, OrderStatusResponse,
    PaymentAmountInfo, RegisterOrderResponse,
};

/// Gateway endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// One-phase order registration.
    Register,
    /// Two-phase registration (authorize only, capture with [`Operation::Deposit`]).
    PreAuth,
    /// Capture of a pre-authorized order.
    Deposit,
    /// Refund of a completed order.
    Refund,
    /// Reversal of an authorization.
    Reversal,
    /// Cancellation of an unpaid order.
    Cancel,
    /// Extended status query.
    Status,
}

impl Operation {
    /// Every operation.
    pub const ALL: [Self; 7] = [
        Self::Register,
        Self::PreAuth,
        Self::Deposit,
        Self::Refund,
        Self::Reversal,
        Self::Cancel,
        Self::Status,
    ];

    /// Endpoint path relative to the base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Register => "register.do",
            Self::PreAuth => "registerPreAuth.do",
            Self::Deposit => "deposit.do",
            Self::Refund => "refund.do",
            Self::Reversal => "reverse.do",
            Self::Cancel => "decline.do",
            Self::Status => "getOrderStatusExtended.do",
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(self) -> HttpMethod {
        match self {
            Self::Status => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }
}
