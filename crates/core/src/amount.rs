//! Amount - Non-negative decimal wrapper for ledger values
//!
//! Premiums, operator funding and payout credits are never negative.
//! This is enforced at the type level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when working with amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("Invalid amount: {0}")]
    Invalid(String),
}

/// A non-negative decimal amount.
///
/// # Invariant
/// The inner value is always >= 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use surety_core::Amount;
/// use rust_decimal::Decimal;
///
/// let premium = Amount::new(Decimal::new(5, 1)).unwrap(); // 0.5
/// assert_eq!(premium.value(), Decimal::new(5, 1));
///
/// // Negative amounts are rejected
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            Err(AmountError::NegativeAmount(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Whole units, e.g. `Amount::units(10)` for the default funding minimum.
    pub fn units(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition - returns None on overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - returns None if result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Amount(result))
        }
    }

    /// Scale by a non-negative factor (payout multiplier).
    ///
    /// Returns None on overflow or if the factor is negative.
    pub fn checked_scale(&self, factor: Decimal) -> Option<Amount> {
        if factor < Decimal::ZERO {
            return None;
        }
        self.0.checked_mul(factor).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|e| AmountError::Invalid(e.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fractional_premium_accepted() {
        let premium = Amount::new(dec!(0.25)).unwrap();
        assert_eq!(premium.value(), dec!(0.25));
        assert!(Amount::ZERO.is_zero());
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn test_negative_funding_rejected() {
        assert!(matches!(Amount::new(dec!(-10)), Err(AmountError::NegativeAmount(_))));
    }

    #[test]
    fn test_withdraw_more_than_pool_is_none() {
        let pool = Amount::units(10);
        let credit = Amount::new(dec!(10.5)).unwrap();
        assert!(pool.checked_sub(&credit).is_none());
        assert_eq!(credit.checked_sub(&pool).unwrap(), Amount::new(dec!(0.5)).unwrap());
    }

    #[test]
    fn test_checked_scale_payout() {
        let premium = Amount::new(dec!(0.4)).unwrap();
        let payout = premium.checked_scale(dec!(1.5)).unwrap();
        assert_eq!(payout.value(), dec!(0.6));
        assert!(premium.checked_scale(dec!(-1)).is_none());
    }

    #[test]
    fn test_parse() {
        let amount: Amount = "1.25".parse().unwrap();
        assert_eq!(amount.value(), dec!(1.25));
        assert!(matches!("-3".parse::<Amount>(), Err(AmountError::NegativeAmount(_))));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn test_display_normalizes() {
        let amount = Amount::new(dec!(1.50)).unwrap();
        assert_eq!(amount.to_string(), "1.5");
    }

    #[test]
    fn test_serde_rejects_negative() {
        let parsed: Result<Amount, _> = serde_json::from_str("\"-1\"");
        assert!(parsed.is_err());
    }
}
