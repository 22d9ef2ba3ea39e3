//! Gateway response types.
//!
//! Every response carries the [`GatewayResponse`] envelope. A non-zero
//! `errorCode` is data, not an error; callers that want to escalate it use
//! [`GatewayResponse::ensure_success`].

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
    currency::{alpha_to_numeric, from_minor_unit, normalize_currency_string},
    error::{GatewayError, Result},
};

/// Common `{errorCode, errorMessage}` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayResponse {
    /// `0` on success. Sent by the gateway as a number or as numeric text.
    #[serde(deserialize_with = "deserialize_error_code")]
    pub error_code: i32,
    /// Human-readable error description.
    pub error_message: String,
}

impl GatewayResponse {
    /// Returns true if the gateway reported no error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error_code == 0
    }

    /// Turns a business error into [`GatewayError::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when `errorCode` is non-zero.
    pub fn ensure_success(&self) -> Result<()> {
        if self.is_success() {
            return Ok(());
        }
        Err(GatewayError::Rejected {
            code: self.error_code,
            message: self.error_message.clone(),
        })
    }
}

fn deserialize_error_code<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    struct ErrorCodeVisitor;

    impl de::Visitor<'_> for ErrorCodeVisitor {
        type Value = i32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<i32, E> {
            i32::try_from(v).map_err(|_| E::custom(format!("errorCode {v} out of range")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<i32, E> {
            i32::try_from(v).map_err(|_| E::custom(format!("errorCode {v} out of range")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<i32, E> {
            let v = v.trim();
            if v.is_empty() {
                return Ok(0);
            }
            v.parse().map_err(|_| E::custom(format!("errorCode {v:?} is not numeric")))
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<i32, E> {
            Ok(0)
        }
    }

    deserializer.deserialize_any(ErrorCodeVisitor)
}

/// Response of `register.do` and `registerPreAuth.do`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterOrderResponse {
    /// Error envelope.
    #[serde(flatten)]
    pub response: GatewayResponse,
    /// Gateway order identifier.
    pub order_id: String,
    /// Payment page the customer is redirected to.
    pub form_url: String,
}

/// Order state reported by `getOrderStatusExtended.do`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Registered, not paid.
    Registered,
    /// Amount held (two-phase payment).
    Authorized,
    /// Fully authorized and captured.
    Completed,
    /// Authorization reversed.
    Cancelled,
    /// Refunded.
    Refunded,
    /// Authorization started through the issuer ACS.
    Pending,
    /// Declined.
    Declined,
    /// Awaiting payment.
    Waiting,
    /// Partially paid.
    Partial,
    /// Value outside `0..=8`.
    Unknown(i64),
}

impl OrderStatus {
    /// Maps the wire value.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Registered,
            1 => Self::Authorized,
            2 => Self::Completed,
            3 => Self::Cancelled,
            4 => Self::Refunded,
            5 => Self::Pending,
            6 => Self::Declined,
            7 => Self::Waiting,
            8 => Self::Partial,
            other => Self::Unknown(other),
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Registered => 0,
            Self::Authorized => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
            Self::Refunded => 4,
            Self::Pending => 5,
            Self::Declined => 6,
            Self::Waiting => 7,
            Self::Partial => 8,
            Self::Unknown(code) => code,
        }
    }

    /// Returns true if money has been captured for the order.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Completed | Self::Partial)
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::from_code)
    }
}

/// Card binding attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BindingInfo {
    /// Customer identifier the binding belongs to.
    pub client_id: String,
    /// Binding identifier.
    pub binding_id: String,
    /// Milliseconds since the Unix epoch.
    pub auth_date_time: i64,
    /// Retrieval reference number.
    pub auth_ref_num: String,
    /// Terminal identifier.
    pub terminal_id: String,
}

/// Amounts per payment stage, in minor units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentAmountInfo {
    /// Held amount.
    pub approved_amount: i64,
    /// Captured amount.
    pub deposited_amount: i64,
    /// Refunded amount.
    pub refunded_amount: i64,
    /// Payment stage, e.g. `DEPOSITED`.
    pub payment_state: String,
}

/// Issuing bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankInfo {
    /// Bank name.
    pub bank_name: String,
    /// ISO 3166 country code.
    pub bank_country_code: String,
    /// Country name.
    pub bank_country_name: String,
}

/// Card used for the payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardAuthInfo {
    /// Masked card number.
    pub masked_pan: String,
    /// `YYYYMM`.
    pub expiration: String,
    /// Name embossed on the card.
    pub cardholder_name: String,
    /// Card number, when the merchant is allowed to see it.
    pub pan: String,
    /// Issuer approval code.
    pub approval_code: String,
}

/// Response of `getOrderStatusExtended.do`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStatusResponse {
    /// Error envelope.
    #[serde(flatten)]
    pub response: GatewayResponse,
    /// Gateway order identifier.
    pub order_id: String,
    /// Merchant order number.
    pub order_number: String,
    /// Order state; absent when the order is unknown.
    pub order_status: Option<OrderStatus>,
    /// Processing response code.
    pub action_code: i32,
    /// Processing response description.
    pub action_code_description: String,
    /// Retrieval reference number.
    pub auth_ref_num: String,
    /// Terminal identifier.
    pub terminal_id: String,
    /// Order amount in minor units.
    pub amount: i64,
    /// Currency as sent by the gateway, numeric or alpha.
    pub currency: String,
    /// Registration time, milliseconds since the Unix epoch.
    pub date: i64,
    /// Capture time, milliseconds since the Unix epoch.
    pub deposited_date: i64,
    /// Refund time, milliseconds since the Unix epoch.
    pub refunded_date: i64,
    /// Reversal time, milliseconds since the Unix epoch.
    pub reversed_date: i64,
    /// Authorization time, milliseconds since the Unix epoch.
    pub auth_date_time: i64,
    /// Payment method.
    pub payment_way: String,
    /// True if the order was refunded.
    pub refund: bool,
    /// Card binding.
    pub binding_info: Option<BindingInfo>,
    /// Per-stage amounts.
    pub payment_amount_info: Option<PaymentAmountInfo>,
    /// Issuing bank.
    pub bank_info: Option<BankInfo>,
    /// Card used.
    pub card_auth_info: Option<CardAuthInfo>,
}

impl OrderStatusResponse {
    /// Numeric ISO 4217 code of the order currency, if known.
    #[must_use]
    pub fn currency_code(&self) -> Option<u16> {
        alpha_to_numeric(&normalize_currency_string(&self.currency))
    }

    /// Order amount in major units.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnsupportedCurrency`] if the currency is not
    /// in the table.
    pub fn amount(&self) -> Result<Decimal> {
        let code = self.currency_code().ok_or_else(|| {
            GatewayError::UnsupportedCurrency(self.currency.trim().parse().unwrap_or_default())
        })?;
        from_minor_unit(self.amount, code)
    }

    /// Registration time.
    #[must_use]
    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.date)
    }

    /// Capture time.
    #[must_use]
    pub fn deposited_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.deposited_date)
    }

    /// Refund time.
    #[must_use]
    pub fn refunded_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.refunded_date)
    }

    /// Reversal time.
    #[must_use]
    pub fn reversed_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.reversed_date)
    }

    /// Authorization time.
    #[must_use]
    pub fn authorized_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.auth_date_time)
    }
}

// Zero means "not happened yet".
fn timestamp(millis: i64) -> Option<DateTime<Utc>> {
    if millis == 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis)
}
