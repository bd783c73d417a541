//! Amount type for handling monetary values typed into quotation fields.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Values may be typed with or
//! without a rupee sign and separators, and are always displayed with two decimals. Separators are
//! placed the Indian way: the last three digits, then groups of two (lakh, crore).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use tracing::trace;

const RUPEE: char = '₹';

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ rupee: true, commas: true }` -> `₹1,50,000.00`
///  - `AmountFormat{ rupee: false, commas: true }` -> `1,50,000.00`
///  - `AmountFormat{ rupee: false, commas: false }` -> `60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a rupee sign is present in the formatting.
    rupee: bool,
    /// Whether commas are present as lakh/crore separators in the formatting.
    commas: bool,
}

impl AmountFormat {
    pub const fn new(rupee: bool, commas: bool) -> Self {
        Self { rupee, commas }
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format is plain two-decimal text: e.g. `60000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    rupee: false,
    commas: false,
};

/// Represents a monetary amount.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// ```
/// # use fieldsales::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₹1,23,456.5").unwrap();
/// assert_eq!(amount.to_string(), "₹1,23,456.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Creates a new Amount from a Decimal value with the specified formatting.
    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Parses text the way a form field is read: anything that does not parse is zero.
    pub fn parse_or_zero(s: &str) -> Self {
        match Amount::from_str(s) {
            Ok(amount) => amount,
            Err(e) => {
                trace!("Treating '{s}' as zero: {e}");
                Amount::default()
            }
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn format(&self) -> AmountFormat {
        self.format
    }

    /// Returns a copy of this amount that will display with `format`.
    pub fn with_format(self, format: AmountFormat) -> Self {
        Self { format, ..self }
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative. Negative zero is not negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
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

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let (rupee, number) = match unsigned.strip_prefix(RUPEE) {
            Some(rest) => (true, rest.trim_start()),
            None => (false, unsigned),
        };

        // Remove commas (thousand separators)
        let without_commas = number.replace(',', "");
        let commas = without_commas.len() < number.len();

        let mut value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        if negative {
            value.set_sign_negative(true);
        }
        Ok(Amount {
            value,
            format: AmountFormat { rupee, commas },
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = self
            .value()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let (sign, num) = if rounded.is_sign_negative() && !rounded.is_zero() {
            ("-", rounded.abs())
        } else {
            ("", rounded.abs())
        };

        let symbol = if self.format.rupee {
            RUPEE.to_string()
        } else {
            String::new()
        };

        if self.format.commas {
            let text = format!("{num:.2}");
            let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
            write!(f, "{sign}{symbol}{}.{frac}", group_indian(int))
        } else {
            write!(f, "{sign}{symbol}{num:.2}")
        }
    }
}

/// Puts commas into a run of digits: the last three, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (mut rest, last) = digits.split_at(digits.len() - 3);
    let mut groups = vec![last];
    while rest.len() > 2 {
        let (head, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = head;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    groups.join(",")
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

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50").unwrap();
        assert_eq!(amount.value(), dec("50"));
        assert_eq!(amount.to_string(), "50.00");
    }

    #[test]
    fn test_parse_with_rupee_and_commas() {
        let amount = Amount::from_str("₹1,23,456.7").unwrap();
        assert_eq!(amount.value(), dec("123456.7"));
        assert_eq!(amount.format(), AmountFormat::new(true, true));
        assert_eq!(amount.to_string(), "₹1,23,456.70");
    }

    #[test]
    fn test_commas_group_by_lakh_and_crore() {
        let commas = AmountFormat::new(false, true);
        let show = |s: &str| Amount::new_with_format(dec(s), commas).to_string();
        assert_eq!(show("0"), "0.00");
        assert_eq!(show("999"), "999.00");
        assert_eq!(show("1000"), "1,000.00");
        assert_eq!(show("150000"), "1,50,000.00");
        assert_eq!(show("12345678.9"), "1,23,45,678.90");
        assert_eq!(show("-150000"), "-1,50,000.00");
    }

    #[test]
    fn test_commas_keep_every_digit() {
        let amount = Amount::from_str("12,345,678,901,234,567.89").unwrap();
        assert_eq!(amount.to_string(), "12,34,56,78,90,12,34,567.89");
        let lakh = Amount::from_str("₹1,50,000").unwrap();
        assert_eq!(lakh.to_string(), "₹1,50,000.00");
    }

    #[test]
    fn test_parse_negative() {
        let amount = Amount::from_str("-₹12.5").unwrap();
        assert_eq!(amount.value(), dec("-12.5"));
        assert_eq!(amount.to_string(), "-₹12.50");
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert!(Amount::from_str("").unwrap().is_zero());
        assert!(Amount::from_str("   ").unwrap().is_zero());
        assert_eq!(Amount::from_str("  42.10 ").unwrap().value(), dec("42.10"));
    }

    #[test]
    fn test_parse_or_zero() {
        assert!(Amount::parse_or_zero("abc").is_zero());
        assert!(Amount::parse_or_zero("12abc").is_zero());
        assert_eq!(Amount::parse_or_zero("7.25").value(), dec("7.25"));
    }

    #[test]
    fn test_display_rounds_to_two_places() {
        assert_eq!(Amount::new(dec("2.345")).to_string(), "2.35");
        assert_eq!(Amount::new(dec("2.344")).to_string(), "2.34");
        assert_eq!(Amount::new(dec("-0.001")).to_string(), "0.00");
        assert_eq!(Amount::new(Decimal::ZERO).to_string(), "0.00");
    }

    #[test]
    fn test_negative_zero_is_not_negative() {
        let mut zero = Decimal::ZERO;
        zero.set_sign_negative(true);
        assert!(!Amount::new(zero).is_negative());
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec("50"));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"50.00\"");
        let back: Amount = serde_json::from_str("\"₹50\"").unwrap();
        assert_eq!(back.value(), dec("50"));
    }
}
