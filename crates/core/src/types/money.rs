//! Money amounts and order pricing.
//!
//! All amounts are [`Decimal`] values in the marketplace currency (MAD),
//! kept at two decimal places. Pricing an order always goes through
//! [`PricingPolicy::quote`], which is the only place the order total is
//! computed, so `total = subtotal + shipping_cost + tax` holds for every
//! breakdown it returns.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors produced by money arithmetic.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount cannot be negative")]
    Negative,
    #[error("amount is too large")]
    Overflow,
    #[error("an order needs at least one line")]
    NoLines,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// A non-negative amount rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` from a decimal, rounding to two places.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] for negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(round_cents(amount)))
    }

    /// Create a `Money` from an integer number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the sum does not fit a decimal.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiply by a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product does not fit a decimal.
    pub fn times(self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// One priced order line: a unit price and how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmount {
    pub unit_price: Money,
    pub quantity: u32,
}

/// The priced totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
}

/// Shipping and tax rules applied to every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Flat shipping fee per order.
    pub shipping_flat: Money,
    /// Tax rate applied to the subtotal, e.g. `0.10` for 10%.
    pub tax_rate: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            shipping_flat: Money(Decimal::new(5000, 2)),
            tax_rate: Decimal::new(10, 2),
        }
    }
}

impl PricingPolicy {
    /// Price a set of order lines.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no lines, a line has quantity zero, or
    /// the arithmetic overflows.
    pub fn quote(&self, lines: &[LineAmount]) -> Result<PricingBreakdown, MoneyError> {
        if lines.is_empty() {
            return Err(MoneyError::NoLines);
        }

        let mut subtotal = Money::ZERO;
        for line in lines {
            if line.quantity == 0 {
                return Err(MoneyError::ZeroQuantity);
            }
            subtotal = subtotal.checked_add(line.unit_price.times(line.quantity)?)?;
        }

        let tax = subtotal
            .0
            .checked_mul(self.tax_rate)
            .ok_or(MoneyError::Overflow)
            .and_then(Money::new)?;
        let total = subtotal
            .checked_add(self.shipping_flat)?
            .checked_add(tax)?;

        Ok(PricingBreakdown {
            subtotal,
            shipping_cost: self.shipping_flat,
            tax,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap()).unwrap()
    }

    fn line(price: &str, quantity: u32) -> LineAmount {
        LineAmount {
            unit_price: money(price),
            quantity,
        }
    }

    #[test]
    fn test_default_policy_quote() {
        // 2 x 120.00 + 1 x 35.50 = 275.50, tax 27.55, shipping 50
        let quote = PricingPolicy::default()
            .quote(&[line("120", 2), line("35.50", 1)])
            .unwrap();
        assert_eq!(quote.subtotal, money("275.50"));
        assert_eq!(quote.shipping_cost, money("50"));
        assert_eq!(quote.tax, money("27.55"));
        assert_eq!(quote.total, money("353.05"));
    }

    #[test]
    fn test_total_is_sum_of_parts() {
        let policy = PricingPolicy::default();
        for (price, qty) in [("0.01", 1), ("19.99", 3), ("1234.56", 7), ("0.05", 1)] {
            let q = policy.quote(&[line(price, qty)]).unwrap();
            let sum = q.subtotal.amount() + q.shipping_cost.amount() + q.tax.amount();
            assert_eq!(q.total.amount(), sum);
        }
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 0.05 * 10% = 0.005 -> 0.01
        let q = PricingPolicy::default().quote(&[line("0.05", 1)]).unwrap();
        assert_eq!(q.tax, money("0.01"));
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy {
            shipping_flat: Money::ZERO,
            tax_rate: Decimal::ZERO,
        };
        let q = policy.quote(&[line("10", 3)]).unwrap();
        assert_eq!(q.total, money("30"));
    }

    #[test]
    fn test_quote_rejects_empty_and_zero_quantity() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.quote(&[]), Err(MoneyError::NoLines));
        assert_eq!(policy.quote(&[line("5", 0)]), Err(MoneyError::ZeroQuantity));
    }

    #[test]
    fn test_money_rejects_negative_and_rounds() {
        assert_eq!(
            Money::new(Decimal::from_str("-1").unwrap()),
            Err(MoneyError::Negative)
        );
        assert_eq!(money("10.005").to_string(), "10.01");
        assert_eq!(Money::from_cents(1999).to_string(), "19.99");
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_rejects_negative() {
        let m: Money = serde_json::from_str("12.5").unwrap();
        assert_eq!(m.to_string(), "12.50");
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"12.50\"");
        assert!(serde_json::from_str::<Money>("-3").is_err());
    }

    #[test]
    fn test_deserialize_accepts_decimal_strings() {
        let m: Money = serde_json::from_str("\"450.005\"").unwrap();
        assert_eq!(m, money("450.01"));
        assert!(serde_json::from_str::<Money>("\"-0.50\"").is_err());
        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
    }
}
