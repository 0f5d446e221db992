//! Amount type for handling monetary values read from, and written to, grid cells.
//!
//! Cells hold plain decimal strings such as `2000` or `12.5`. When reading a cell that a person
//! may have typed into, `Amount::lenient` strips currency symbols and separators and treats
//! anything unparseable as zero. Display for reports goes through `CurrencyFormat`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a currency amount.
///
/// # Examples
///
/// Parsing with a currency symbol and thousands separators:
/// ```
/// # use week_ledger::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,250.50").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
/// ```
///
/// Lenient parsing never fails:
/// ```
/// # use week_ledger::model::Amount;
/// assert!(Amount::lenient("n/a").is_zero());
/// assert_eq!(Amount::lenient("COP 2,000").to_string(), "2000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// `self + rhs`, or `None` if the result does not fit.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// `self × quantity`, or `None` if the result does not fit.
    pub fn checked_mul(self, quantity: Decimal) -> Option<Amount> {
        self.0.checked_mul(quantity).map(Self)
    }

    /// Adds up `amounts`, or `None` as soon as the running sum no longer fits.
    pub fn checked_sum<I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |sum, amount| sum.checked_add(amount))
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Parses a cell value the way a spreadsheet user would expect: every character other than
    /// digits, `.` and `-` is dropped, and whatever cannot be parsed after that is zero.
    pub fn lenient(s: &str) -> Self {
        let cleaned: String = s
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        if cleaned.is_empty() {
            return Self::ZERO;
        }
        Decimal::from_str(&cleaned).map(Self).unwrap_or_default()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Strict parsing for user input: an optional leading `-`, an optional `$` and commas as
    /// thousands separators are accepted, anything else must be a valid decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);
        let digits = rest.replace(',', "");
        let value = Decimal::from_str(&digits).map_err(AmountError)?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// How amounts are rendered in reports: a currency symbol, a thousands separator and no decimal
/// places, e.g. `$1.234.567` with the default settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    symbol: String,
    thousands_separator: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new("$", ".")
    }
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, thousands_separator: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            thousands_separator: thousands_separator.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn thousands_separator(&self) -> &str {
        &self.thousands_separator
    }

    /// Rounds half away from zero to a whole number and groups the digits.
    pub fn format(&self, amount: Amount) -> String {
        let rounded = amount
            .value()
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = rounded.abs().trunc().to_string();
        format!("{sign}{}{}", self.symbol, self.group(&digits))
    }

    /// Inserts the thousands separator into a run of ASCII digits.
    fn group(&self, digits: &str) -> String {
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push_str(&self.thousands_separator);
            }
            out.push(c);
        }
        out
    }
}
