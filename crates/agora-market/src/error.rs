//! Error types for agora-market.

use agora_core::{AccountId, Amount};
use thiserror::Error;

use crate::listing::{ListingId, ListingStatus};
use crate::order::{OrderId, OrderStatus};

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Errors that can occur in marketplace operations.
///
/// Every error is reported synchronously and leaves all state unchanged.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Listing id is unknown.
    #[error("listing not found: {0}")]
    ListingNotFound(ListingId),

    /// Order id is unknown.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// Caller is not the party required for this action.
    #[error("unauthorized: {caller} may not {action}")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
        /// The action that was attempted.
        action: String,
    },

    /// Listing is no longer available for this action.
    #[error("listing unavailable: {id} is {status}")]
    ListingUnavailable {
        /// The listing id.
        id: ListingId,
        /// The listing's current status.
        status: ListingStatus,
    },

    /// Order has already reached a terminal state.
    #[error("order already finalized: {id} is {status}")]
    OrderFinalized {
        /// The order id.
        id: OrderId,
        /// The order's current status.
        status: OrderStatus,
    },

    /// Payment below the listing price.
    #[error("buyer didn't send enough ether: price {required}, sent {paid}")]
    InsufficientPayment {
        /// The listing price.
        required: Amount,
        /// The amount actually sent.
        paid: Amount,
    },

    /// Ledger debit exceeds the account balance.
    ///
    /// During settlement or refund this cannot occur unless the escrow-hold
    /// accounting is broken; the facade logs it as an invariant violation.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount required for the debit.
        required: Amount,
        /// Amount currently available.
        available: Amount,
    },

    /// Listing fields failed validation.
    #[error("invalid listing: {0}")]
    InvalidListing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_payment_display() {
        let err = MarketError::InsufficientPayment {
            required: Amount::from_wei(25_000_000),
            paid: Amount::from_wei(1),
        };
        let text = err.to_string();
        assert!(text.contains("didn't send enough ether"));
        assert!(text.contains("25000000"));
    }

    #[test]
    fn unauthorized_display_names_the_action() {
        let caller = agora_core::Keypair::generate();
        let err = MarketError::Unauthorized {
            caller: caller.account_id().clone(),
            action: "modify this listing".to_string(),
        };
        assert!(err.to_string().contains("modify this listing"));
    }

    #[test]
    fn order_finalized_display() {
        let err = MarketError::OrderFinalized {
            id: OrderId::from_string("order-test"),
            status: OrderStatus::Completed,
        };
        let text = err.to_string();
        assert!(text.contains("order-test"));
        assert!(text.contains("completed"));
    }
}
