//! Wei-denominated value amounts.
//!
//! Every price, payment, and balance in the engine is an integer number of
//! wei (the smallest value unit). There is no decimal representation inside
//! the engine; callers convert at the edges.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of value in wei.
///
/// Arithmetic is explicit: mutation paths use the checked or saturating
/// variants, never bare operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount {
    wei: u64,
}

impl Amount {
    /// Zero wei.
    pub const ZERO: Self = Self { wei: 0 };

    /// Maximum representable amount.
    pub const MAX: Self = Self { wei: u64::MAX };

    /// Create an amount from wei.
    #[must_use]
    pub const fn from_wei(wei: u64) -> Self {
        Self { wei }
    }

    /// Get the amount in wei.
    #[must_use]
    pub const fn wei(&self) -> u64 {
        self.wei
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.wei == 0
    }

    /// Checked addition.
    #[must_use]
    pub const fn checked_add(&self, other: Self) -> Option<Self> {
        match self.wei.checked_add(other.wei) {
            Some(wei) => Some(Self { wei }),
            None => None,
        }
    }

    /// Checked subtraction.
    #[must_use]
    pub const fn checked_sub(&self, other: Self) -> Option<Self> {
        match self.wei.checked_sub(other.wei) {
            Some(wei) => Some(Self { wei }),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(&self, other: Self) -> Self {
        Self {
            wei: self.wei.saturating_add(other.wei),
        }
    }

    /// Saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        Self {
            wei: self.wei.saturating_sub(other.wei),
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.wei)
    }
}

impl From<u64> for Amount {
    fn from(wei: u64) -> Self {
        Self::from_wei(wei)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_from_wei_roundtrips() {
        let amount = Amount::from_wei(1_000_000);
        assert_eq!(amount.wei(), 1_000_000);
    }

    #[test]
    fn amount_zero_is_zero() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::from_wei(1).is_zero());
    }

    #[test]
    fn amount_default_is_zero() {
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn amount_ordering() {
        assert!(Amount::from_wei(200_000) < Amount::from_wei(1_000_000));
        assert!(Amount::MAX > Amount::ZERO);
    }

    #[test]
    fn checked_add_detects_overflow() {
        assert_eq!(
            Amount::from_wei(1).checked_add(Amount::from_wei(2)),
            Some(Amount::from_wei(3))
        );
        assert_eq!(Amount::MAX.checked_add(Amount::from_wei(1)), None);
    }

    #[test]
    fn checked_sub_detects_underflow() {
        assert_eq!(
            Amount::from_wei(3).checked_sub(Amount::from_wei(2)),
            Some(Amount::from_wei(1))
        );
        assert_eq!(Amount::ZERO.checked_sub(Amount::from_wei(1)), None);
    }

    #[test]
    fn saturating_ops_clamp_at_bounds() {
        assert_eq!(Amount::MAX.saturating_add(Amount::from_wei(1)), Amount::MAX);
        assert_eq!(
            Amount::ZERO.saturating_sub(Amount::from_wei(1)),
            Amount::ZERO
        );
    }

    #[test]
    fn amount_display() {
        assert_eq!(Amount::from_wei(25_000_000).to_string(), "25000000 wei");
        assert_eq!(Amount::ZERO.to_string(), "0 wei");
    }

    #[test]
    fn amount_serialization_roundtrip() {
        let amount = Amount::from_wei(200_000);
        let json = serde_json::to_string(&amount).expect("serialize");
        let parsed: Amount = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(amount, parsed);
    }

    #[test]
    fn amount_from_u64() {
        let amount: Amount = 42u64.into();
        assert_eq!(amount.wei(), 42);
    }
}
