//! Escrow ledger for participant balances.
//!
//! The ledger is the only representation of who is owed what: escrow holds
//! from purchases, seller proceeds from completed orders, and voluntary
//! deposits all live here. Every mutation goes through [`Ledger::credit`],
//! [`Ledger::debit`], or [`Ledger::drain`], so the conservation invariant
//! (no transition creates or destroys value) is enforced in one place.
//!
//! Crediting an account never performs an external transfer; balances
//! accumulate and are paid out by an explicit withdraw step.

use std::collections::HashMap;

use agora_core::{AccountId, Amount};
use serde::{Deserialize, Serialize};

use crate::error::{MarketError, Result};

/// Per-participant running balances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    balances: HashMap<AccountId, Amount>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increases an account's balance. Infallible; saturates at the
    /// representable maximum.
    pub fn credit(&mut self, account: &AccountId, amount: Amount) {
        let balance = self
            .balances
            .entry(account.clone())
            .or_insert(Amount::ZERO);
        *balance = balance.saturating_add(amount);
    }

    /// Decreases an account's balance.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientFunds`] if the balance is short;
    /// the ledger is left unchanged.
    pub fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(MarketError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        if let Some(balance) = self.balances.get_mut(account) {
            *balance = balance.saturating_sub(amount);
        }
        Ok(())
    }

    /// Removes and returns an account's entire balance.
    ///
    /// Idempotent: draining an unknown or empty account returns zero.
    pub fn drain(&mut self, account: &AccountId) -> Amount {
        self.balances.remove(account).unwrap_or(Amount::ZERO)
    }

    /// The account's current balance. Unknown accounts read zero.
    #[must_use]
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// The sum of all balances currently held.
    #[must_use]
    pub fn total_held(&self) -> Amount {
        self.balances
            .values()
            .fold(Amount::ZERO, |sum, balance| sum.saturating_add(*balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Keypair;

    fn account() -> AccountId {
        Keypair::generate().account_id().clone()
    }

    #[test]
    fn unknown_account_reads_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance_of(&account()), Amount::ZERO);
    }

    #[test]
    fn credits_accumulate() {
        let mut ledger = Ledger::new();
        let alice = account();

        ledger.credit(&alice, Amount::from_wei(1_000_000));
        ledger.credit(&alice, Amount::from_wei(500));
        assert_eq!(ledger.balance_of(&alice), Amount::from_wei(1_000_500));
    }

    #[test]
    fn debit_reduces_balance() {
        let mut ledger = Ledger::new();
        let alice = account();

        ledger.credit(&alice, Amount::from_wei(1_000_000));
        ledger
            .debit(&alice, Amount::from_wei(400_000))
            .expect("covered");
        assert_eq!(ledger.balance_of(&alice), Amount::from_wei(600_000));
    }

    #[test]
    fn debit_rejects_overdraw_and_leaves_balance_unchanged() {
        let mut ledger = Ledger::new();
        let alice = account();
        ledger.credit(&alice, Amount::from_wei(100));

        let err = ledger
            .debit(&alice, Amount::from_wei(101))
            .expect_err("short");
        match err {
            MarketError::InsufficientFunds {
                required,
                available,
            } => {
                assert_eq!(required, Amount::from_wei(101));
                assert_eq!(available, Amount::from_wei(100));
            }
            other => unreachable!("unexpected error: {other}"),
        }
        assert_eq!(ledger.balance_of(&alice), Amount::from_wei(100));
    }

    #[test]
    fn debit_of_zero_on_unknown_account_is_ok() {
        let mut ledger = Ledger::new();
        assert!(ledger.debit(&account(), Amount::ZERO).is_ok());
    }

    #[test]
    fn accounts_are_isolated() {
        let mut ledger = Ledger::new();
        let alice = account();
        let bob = account();

        ledger.credit(&alice, Amount::from_wei(25_000_000));
        assert_eq!(ledger.balance_of(&bob), Amount::ZERO);
    }

    #[test]
    fn drain_takes_everything_and_is_idempotent() {
        let mut ledger = Ledger::new();
        let alice = account();
        ledger.credit(&alice, Amount::from_wei(200_000));

        assert_eq!(ledger.drain(&alice), Amount::from_wei(200_000));
        assert_eq!(ledger.balance_of(&alice), Amount::ZERO);
        assert_eq!(ledger.drain(&alice), Amount::ZERO);
    }

    #[test]
    fn total_held_sums_all_balances() {
        let mut ledger = Ledger::new();
        let alice = account();
        let bob = account();

        assert_eq!(ledger.total_held(), Amount::ZERO);
        ledger.credit(&alice, Amount::from_wei(1_000_000));
        ledger.credit(&bob, Amount::from_wei(200_000));
        assert_eq!(ledger.total_held(), Amount::from_wei(1_200_000));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn account_from(seed: u8) -> AccountId {
            AccountId::from_bytes(&[seed; 32]).expect("32 bytes")
        }

        proptest! {
            #[test]
            fn credit_then_debit_restores_balance(
                start in 0u64..1_000_000_000,
                delta in 0u64..1_000_000_000,
            ) {
                let mut ledger = Ledger::new();
                let alice = account_from(1);

                ledger.credit(&alice, Amount::from_wei(start));
                ledger.credit(&alice, Amount::from_wei(delta));
                ledger.debit(&alice, Amount::from_wei(delta)).expect("covered");

                prop_assert_eq!(ledger.balance_of(&alice), Amount::from_wei(start));
            }

            #[test]
            fn transfers_conserve_total(
                escrow in 1u64..1_000_000_000,
                seeds in proptest::collection::vec(0u8..8, 1..16),
            ) {
                let mut ledger = Ledger::new();
                let buyer = account_from(100);
                ledger.credit(&buyer, Amount::from_wei(escrow));
                let total = ledger.total_held();

                // Moving value between accounts never changes the total.
                for seed in seeds {
                    let to = account_from(seed);
                    let slice = Amount::from_wei(escrow / 16);
                    if ledger.debit(&buyer, slice).is_ok() {
                        ledger.credit(&to, slice);
                    }
                    prop_assert_eq!(ledger.total_held(), total);
                }
            }

            #[test]
            fn debit_never_overdraws(
                balance in 0u64..1_000_000,
                attempt in 0u64..2_000_000,
            ) {
                let mut ledger = Ledger::new();
                let alice = account_from(2);
                ledger.credit(&alice, Amount::from_wei(balance));

                let result = ledger.debit(&alice, Amount::from_wei(attempt));
                if attempt <= balance {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(ledger.balance_of(&alice), Amount::from_wei(balance));
                }
            }
        }
    }
}
