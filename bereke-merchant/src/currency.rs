//! Currency table and minor-unit conversion.
//!
//! The gateway expresses every amount as an integer count of minor units
//! (tiyn, cents, kopecks). This module converts between that wire form and
//! [`Decimal`] major-unit amounts, and maps ISO 4217 alpha codes to their
//! numeric form and back.
//!
//! Rounding is half away from zero: `10.005 USD` becomes `1001` cents and
//! `-10.005 USD` becomes `-1001`.
//!
//! # Examples
//!
//! ```
//! use bereke_merchant::currency;
//! use rust_decimal::Decimal;
//!
//! let amount = Decimal::new(1050, 2); // 10.50
//! assert_eq!(currency::to_minor_unit(amount, 840).unwrap(), 1050);
//! assert_eq!(currency::from_minor_unit(1050, 840).unwrap(), amount);
//! assert_eq!(currency::alpha_to_numeric("KZT"), Some(398));
//! assert_eq!(currency::normalize_currency_string("978"), "EUR");
//! ```

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::error::{GatewayError, Result};

/// Numeric ISO 4217 code for the Kazakhstani tenge.
pub const KZT: u16 = 398;
/// Numeric ISO 4217 code for the US dollar.
pub const USD: u16 = 840;
/// Numeric ISO 4217 code for the Russian ruble.
pub const RUB: u16 = 643;
/// Numeric ISO 4217 code for the euro.
pub const EUR: u16 = 978;

/// One row of the currency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    /// Three-letter ISO 4217 code.
    pub alpha: &'static str,
    /// Numeric ISO 4217 code.
    pub numeric: u16,
    /// Number of decimal places in one major unit (divisor is `10^exponent`).
    pub exponent: u32,
}

impl Currency {
    /// Number of minor units in one major unit.
    #[must_use]
    pub const fn divisor(&self) -> i64 {
        10_i64.pow(self.exponent)
    }
}

static CURRENCIES: &[Currency] = &[
    Currency { alpha: "KZT", numeric: KZT, exponent: 2 },
    Currency { alpha: "USD", numeric: USD, exponent: 2 },
    Currency { alpha: "RUB", numeric: RUB, exponent: 2 },
    Currency { alpha: "EUR", numeric: EUR, exponent: 2 },
];

/// Looks up a currency by numeric code.
#[must_use]
pub fn currency(code: u16) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.numeric == code)
}

/// Iterates over every supported currency.
pub fn supported() -> impl Iterator<Item = &'static Currency> {
    CURRENCIES.iter()
}

fn require(code: u16) -> Result<&'static Currency> {
    currency(code).ok_or(GatewayError::UnsupportedCurrency(code))
}

/// Converts a major-unit amount into minor units.
///
/// # Errors
///
/// - [`GatewayError::UnsupportedCurrency`] if `code` is not in the table
/// - [`GatewayError::AmountOutOfRange`] if the result does not fit in `i64`
pub fn to_minor_unit(amount: Decimal, code: u16) -> Result<i64> {
    let currency = require(code)?;
    let out_of_range = || GatewayError::AmountOutOfRange { amount: amount.to_string(), code };

    amount
        .checked_mul(Decimal::from(currency.divisor()))
        .ok_or_else(out_of_range)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(out_of_range)
}

/// Converts a minor-unit count back into a major-unit amount.
///
/// The result carries the currency's scale, so `1050` USD is `10.50`.
///
/// # Errors
///
/// Returns [`GatewayError::UnsupportedCurrency`] if `code` is not in the table.
pub fn from_minor_unit(minor: i64, code: u16) -> Result<Decimal> {
    let currency = require(code)?;
    Ok(Decimal::new(minor, currency.exponent))
}

/// Maps an alpha code (`"KZT"`) to its numeric code (`398`).
///
/// Lookup is case-sensitive.
#[must_use]
pub fn alpha_to_numeric(alpha: &str) -> Option<u16> {
    CURRENCIES.iter().find(|c| c.alpha == alpha).map(|c| c.numeric)
}

/// Maps a numeric code (`398`) to its alpha code (`"KZT"`).
#[must_use]
pub fn numeric_to_alpha(code: u16) -> Option<&'static str> {
    currency(code).map(|c| c.alpha)
}

/// Normalizes a currency string the gateway may send in either form.
///
/// Integer text is mapped to its alpha code; integer text with no table entry
/// (negative or too large included) yields an empty string. Anything that is
/// not an integer, surrounding whitespace included, is returned unchanged.
#[must_use]
pub fn normalize_currency_string(value: &str) -> String {
    match value.parse::<i64>() {
        Ok(code) => u16::try_from(code)
            .ok()
            .and_then(numeric_to_alpha)
            .unwrap_or_default()
            .to_owned(),
        Err(_) => value.to_owned(),
    }
}
