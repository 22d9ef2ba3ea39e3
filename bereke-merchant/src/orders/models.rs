//! Order request types and their wire encoding.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    currency::to_minor_unit,
    error::{GatewayError, Result},
    params::{ToParameters, WireField},
};

/// Format of the `expirationDate` wire field.
pub const EXPIRATION_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Payment page behavior flag sent as `features`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentFeature {
    /// Payment without cardholder interaction (recurring, by binding).
    AutoPayment,
    /// Card verification without charging.
    Verify,
    /// Force 3-D Secure.
    ForceTds,
    /// Force non-3-D Secure processing.
    ForceSsl,
    /// Force full 3-D Secure (no attempts).
    ForceFullTds,
    /// Always create a card binding.
    ForceCreateBinding,
}

impl PaymentFeature {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoPayment => "AUTO_PAYMENT",
            Self::Verify => "VERIFY",
            Self::ForceTds => "FORCE_TDS",
            Self::ForceSsl => "FORCE_SSL",
            Self::ForceFullTds => "FORCE_FULL_TDS",
            Self::ForceCreateBinding => "FORCE_CREATE_BINDING",
        }
    }
}

impl fmt::Display for PaymentFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn json_params(params: &BTreeMap<String, String>) -> Result<WireField> {
    if params.is_empty() {
        return Ok(WireField::optional::<&str>("jsonParams", None));
    }
    let encoded = serde_json::to_string(params)
        .map_err(|e| GatewayError::InvalidInput(format!("jsonParams: {e}")))?;
    Ok(WireField::required("jsonParams", encoded))
}

fn minor(amount: Option<Decimal>, currency: u16) -> Result<Option<i64>> {
    amount.map(|amount| to_minor_unit(amount, currency)).transpose()
}

/// Order registration (`register.do` / `registerPreAuth.do`).
///
/// Text fields left empty are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterOrderRequest {
    /// Merchant order number, unique per merchant.
    pub order_number: String,
    /// Amount in major units.
    pub amount: Decimal,
    /// Numeric ISO 4217 currency code.
    pub currency: u16,
    /// Redirect after successful payment.
    pub return_url: String,
    /// Redirect after failed payment.
    pub fail_url: String,
    /// Per-order callback URL.
    pub dynamic_callback_url: String,
    /// Free-form description.
    pub description: String,
    /// Payment page language (ISO 639-1).
    pub language: String,
    /// Customer IP address.
    pub ip: String,
    /// Customer identifier for bindings.
    pub client_id: String,
    /// Cardholder name.
    pub cardholder_name: String,
    /// Payment session lifetime.
    pub session_timeout_secs: Option<u32>,
    /// Order expiry, gateway local time.
    pub expiration_date: Option<NaiveDateTime>,
    /// Existing card binding to pay with.
    pub binding_id: String,
    /// Delivery address.
    pub post_address: String,
    /// Fee amount in major units, same currency as `amount`.
    pub fee_input: Option<Decimal>,
    /// Customer email.
    pub email: String,
    /// Payment page behavior flag.
    pub features: Option<PaymentFeature>,
}

impl RegisterOrderRequest {
    /// Creates a request with only the mandatory fields set.
    #[must_use]
    pub fn new(order_number: impl Into<String>, amount: Decimal, currency: u16) -> Self {
        Self { order_number: order_number.into(), amount, currency, ..Self::default() }
    }
}

impl ToParameters for RegisterOrderRequest {
    fn wire_fields(&self) -> Result<Vec<WireField>> {
        let amount = to_minor_unit(self.amount, self.currency)?;
        let fee = minor(self.fee_input, self.currency)?;

        Ok(vec![
            WireField::mandatory("orderNumber", &self.order_number)?,
            WireField::required("amount", amount),
            WireField::required("currency", self.currency),
            WireField::non_empty("returnUrl", &self.return_url),
            WireField::non_empty("failUrl", &self.fail_url),
            WireField::non_empty("dynamicCallbackUrl", &self.dynamic_callback_url),
            WireField::non_empty("description", &self.description),
            WireField::non_empty("language", &self.language),
            WireField::non_empty("ip", &self.ip),
            WireField::non_empty("clientId", &self.client_id),
            WireField::non_empty("cardholderName", &self.cardholder_name),
            WireField::optional("sessionTimeoutSecs", self.session_timeout_secs),
            WireField::optional(
                "expirationDate",
                self.expiration_date.map(|date| date.format(EXPIRATION_DATE_FORMAT)),
            ),
            WireField::non_empty("bindingId", &self.binding_id),
            WireField::non_empty("postAddress", &self.post_address),
            WireField::optional("feeInput", fee),
            WireField::non_empty("email", &self.email),
            WireField::optional("features", self.features),
        ])
    }
}

/// Capture of a pre-authorized order (`deposit.do`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepositOrderRequest {
    /// Gateway order identifier.
    pub order_id: String,
    /// Amount to capture in major units.
    pub amount: Decimal,
    /// Numeric ISO 4217 currency code.
    pub currency: u16,
    /// Response language.
    pub language: String,
    /// Extra attributes forwarded to the gateway as JSON.
    pub json_params: BTreeMap<String, String>,
}

impl ToParameters for DepositOrderRequest {
    fn wire_fields(&self) -> Result<Vec<WireField>> {
        Ok(vec![
            WireField::mandatory("orderId", &self.order_id)?,
            WireField::required("amount", to_minor_unit(self.amount, self.currency)?),
            WireField::required("currency", self.currency),
            WireField::non_empty("language", &self.language),
            json_params(&self.json_params)?,
        ])
    }
}

/// Refund of a completed order (`refund.do`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefundOrderRequest {
    /// Gateway order identifier.
    pub order_id: String,
    /// Amount to refund in major units.
    pub amount: Decimal,
    /// Numeric ISO 4217 currency code.
    pub currency: u16,
    /// Response language.
    pub language: String,
    /// Extra attributes forwarded to the gateway as JSON.
    pub json_params: BTreeMap<String, String>,
    /// Deposited amount the caller expects; guards against duplicate refunds.
    pub expected_deposited_amount: Option<Decimal>,
    /// Merchant-side refund identifier.
    pub external_refund_id: String,
}

impl RefundOrderRequest {
    /// Creates a refund for `amount` of `order_id`.
    #[must_use]
    pub fn new(order_id: impl Into<String>, amount: Decimal, currency: u16) -> Self {
        Self { order_id: order_id.into(), amount, currency, ..Self::default() }
    }
}

impl ToParameters for RefundOrderRequest {
    fn wire_fields(&self) -> Result<Vec<WireField>> {
        let expected = minor(self.expected_deposited_amount, self.currency)?;

        Ok(vec![
            WireField::mandatory("orderId", &self.order_id)?,
            WireField::required("amount", to_minor_unit(self.amount, self.currency)?),
            WireField::required("currency", self.currency),
            WireField::non_empty("language", &self.language),
            json_params(&self.json_params)?,
            WireField::optional("expectedDepositedAmount", expected),
            WireField::non_empty("externalRefundId", &self.external_refund_id),
        ])
    }
}

/// Reversal of an authorization (`reverse.do`).
///
/// Without an amount the whole authorization is reversed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReversalOrderRequest {
    /// Gateway order identifier.
    pub order_id: String,
    /// Merchant order number.
    pub order_number: String,
    /// Partial reversal amount in major units.
    pub amount: Option<Decimal>,
    /// Numeric ISO 4217 currency code; required with `amount`.
    pub currency: Option<u16>,
    /// Response language.
    pub language: String,
    /// Extra attributes forwarded to the gateway as JSON.
    pub json_params: BTreeMap<String, String>,
    /// Login of the merchant the order belongs to.
    pub merchant_login: String,
}

impl ToParameters for ReversalOrderRequest {
    fn wire_fields(&self) -> Result<Vec<WireField>> {
        let amount = match (self.amount, self.currency) {
            (Some(amount), Some(currency)) => Some(to_minor_unit(amount, currency)?),
            (Some(_), None) => {
                return Err(GatewayError::InvalidInput(
                    "reversal amount requires a currency".to_owned(),
                ));
            }
            (None, _) => None,
        };

        Ok(vec![
            WireField::mandatory("orderId", &self.order_id)?,
            WireField::non_empty("orderNumber", &self.order_number),
            WireField::optional("amount", amount),
            WireField::optional("currency", self.currency),
            WireField::non_empty("language", &self.language),
            json_params(&self.json_params)?,
            WireField::non_empty("merchantLogin", &self.merchant_login),
        ])
    }
}

/// Cancellation of an unpaid order (`decline.do`).
///
/// Identifies the order by `order_id`, `order_number`, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelOrderRequest {
    /// Gateway order identifier.
    pub order_id: String,
    /// Merchant order number.
    pub order_number: String,
    /// Response language.
    pub language: String,
}

impl ToParameters for CancelOrderRequest {
    fn wire_fields(&self) -> Result<Vec<WireField>> {
        require_order_reference(&self.order_id, &self.order_number)?;
        Ok(vec![
            WireField::non_empty("orderId", &self.order_id),
            WireField::non_empty("orderNumber", &self.order_number),
            WireField::non_empty("language", &self.language),
        ])
    }
}

/// Extended status query (`getOrderStatusExtended.do`).
///
/// Identifies the order by `order_id`, `order_number`, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStatusRequest {
    /// Gateway order identifier.
    pub order_id: String,
    /// Merchant order number.
    pub order_number: String,
    /// Response language.
    pub language: String,
    /// Login of the merchant the order belongs to.
    pub merchant_login: String,
}

impl OrderStatusRequest {
    /// Query by gateway order identifier.
    #[must_use]
    pub fn by_id(order_id: impl Into<String>) -> Self {
        Self { order_id: order_id.into(), ..Self::default() }
    }

    /// Query by merchant order number.
    #[must_use]
    pub fn by_number(order_number: impl Into<String>) -> Self {
        Self { order_number: order_number.into(), ..Self::default() }
    }
}

impl ToParameters for OrderStatusRequest {
    fn wire_fields(&self) -> Result<Vec<WireField>> {
        require_order_reference(&self.order_id, &self.order_number)?;
        Ok(vec![
            WireField::non_empty("orderId", &self.order_id),
            WireField::non_empty("orderNumber", &self.order_number),
            WireField::non_empty("language", &self.language),
            WireField::non_empty("merchantLogin", &self.merchant_login),
        ])
    }
}

fn require_order_reference(order_id: &str, order_number: &str) -> Result<()> {
    if order_id.is_empty() && order_number.is_empty() {
        return Err(GatewayError::InvalidInput(
            "either orderId or orderNumber is required".to_owned(),
        ));
    }
    Ok(())
}
