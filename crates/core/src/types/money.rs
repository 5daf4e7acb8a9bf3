//! Money amounts as returned by the Storefront API.
//!
//! Shopify sends `MoneyV2` as `{ amount: "12.5", currencyCode: "USD" }`. The
//! amount is parsed into a [`Decimal`] so formatting never goes through floats.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Error parsing a money amount.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount string is not a decimal number.
    #[error("invalid money amount: {0}")]
    InvalidAmount(String),
}

/// ISO 4217 currency code.
///
/// The store sells in USD; the other common codes get a symbol, anything else
/// is rendered with its code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    CAD,
    AUD,
    MXN,
    EUR,
    GBP,
    Other(String),
}

impl CurrencyCode {
    /// Parse a currency code, keeping unknown codes verbatim (uppercased).
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Self::USD,
            "CAD" => Self::CAD,
            "AUD" => Self::AUD,
            "MXN" => Self::MXN,
            "EUR" => Self::EUR,
            "GBP" => Self::GBP,
            other => Self::Other(other.to_string()),
        }
    }

    /// The three-letter code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::USD => "USD",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::MXN => "MXN",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::Other(code) => code,
        }
    }

    /// Prefix symbol, if the currency has one.
    #[must_use]
    pub const fn symbol(&self) -> Option<&'static str> {
        match self {
            Self::USD | Self::CAD | Self::AUD | Self::MXN => Some("$"),
            Self::EUR => Some("€"),
            Self::GBP => Some("£"),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An amount of money in a currency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Money {
    /// Amount in the currency's standard unit (dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse the API representation (`"12.5"`, `"USD"`).
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::InvalidAmount`] if `amount` is not a decimal.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, MoneyError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| MoneyError::InvalidAmount(amount.to_string()))?;
        Ok(Self::new(amount, CurrencyCode::parse(currency_code)))
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Format with two decimals and thousands separators, e.g. `$1,234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        self.render(false)
    }

    /// Like [`display`](Self::display) but drops `.00` on whole amounts: `$12`, `$12.50`.
    #[must_use]
    pub fn display_without_trailing_zeros(&self) -> String {
        self.render(true)
    }

    fn render(&self, trim_whole: bool) -> String {
        let rounded = self
            .amount
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let whole = rounded.trunc();
        let cents = ((rounded - whole) * Decimal::ONE_HUNDRED).trunc().to_string();

        let mut number = group_thousands(&whole.to_string());
        if !(trim_whole && cents == "0") {
            number.push_str(&format!(".{cents:0>2}"));
        }

        let sign = if self.amount.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        match self.currency_code.symbol() {
            Some(symbol) => format!("{sign}{symbol}{number}"),
            None => format!("{sign}{number} {}", self.currency_code.code()),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
