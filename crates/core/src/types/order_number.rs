//! Human-facing order numbers.
//!
//! An order number is `ART`, the order date as `yyMMdd`, and a four-digit
//! suffix, e.g. `ART2503140427`. The suffix is chosen by the caller (usually
//! at random) and the database enforces uniqueness.

use core::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const PREFIX: &str = "ART";
const DATE_LEN: usize = 6;
const SUFFIX_LEN: usize = 4;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    #[error("order number must start with ART")]
    MissingPrefix,
    #[error("order number must be ART followed by 10 digits")]
    InvalidFormat,
    #[error("order number suffix must be below 10000")]
    SuffixOutOfRange,
}

/// A validated order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number for `date` with the given suffix.
    ///
    /// # Errors
    ///
    /// Returns [`OrderNumberError::SuffixOutOfRange`] if `suffix` has more
    /// than four digits.
    pub fn compose(date: NaiveDate, suffix: u16) -> Result<Self, OrderNumberError> {
        if suffix > 9999 {
            return Err(OrderNumberError::SuffixOutOfRange);
        }
        Ok(Self(format!(
            "{PREFIX}{:02}{:02}{:02}{suffix:04}",
            date.year().rem_euclid(100),
            date.month(),
            date.day()
        )))
    }

    /// Parse an existing order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not `ART` followed by ten digits.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let digits = s.strip_prefix(PREFIX).ok_or(OrderNumberError::MissingPrefix)?;
        if digits.len() != DATE_LEN + SUFFIX_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberError::InvalidFormat);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compose_pads_every_part() {
        let n = OrderNumber::compose(date(2025, 3, 4), 27).unwrap();
        assert_eq!(n.as_str(), "ART2503040027");
        let n = OrderNumber::compose(date(2031, 12, 31), 9999).unwrap();
        assert_eq!(n.as_str(), "ART3112319999");
    }

    #[test]
    fn test_compose_rejects_large_suffix() {
        assert_eq!(
            OrderNumber::compose(date(2025, 1, 1), 10_000),
            Err(OrderNumberError::SuffixOutOfRange)
        );
    }

    #[test]
    fn test_parse() {
        assert!(OrderNumber::parse("ART2503040027").is_ok());
        assert_eq!(
            OrderNumber::parse("ORD2503040027"),
            Err(OrderNumberError::MissingPrefix)
        );
        assert_eq!(
            OrderNumber::parse("ART25030400"),
            Err(OrderNumberError::InvalidFormat)
        );
        assert_eq!(
            OrderNumber::parse("ART25030400AB"),
            Err(OrderNumberError::InvalidFormat)
        );
    }
}
