//! Typed marketplace notifications.
//!
//! Every observable state transition publishes one event. Emission is
//! decoupled from the transition itself: the facade pushes events onto a
//! broadcast channel after the critical section commits, and an external
//! indexing or observability layer consumes them.

use serde::{Deserialize, Serialize};

use agora_core::{AccountId, Amount};

use crate::listing::ListingId;
use crate::order::OrderId;

/// A notification describing one committed state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A seller created a listing.
    ListingCreated {
        /// The new listing.
        listing_id: ListingId,
        /// The creating seller.
        seller: AccountId,
    },

    /// A seller modified a listing's editable fields.
    ListingModified {
        /// The modified listing.
        listing_id: ListingId,
    },

    /// A buyer purchased a listing; payment is held in escrow.
    OrderCreated {
        /// The new order.
        order_id: OrderId,
        /// The purchased listing.
        listing_id: ListingId,
        /// The purchasing participant.
        buyer: AccountId,
    },

    /// Both parties approved; the escrow hold settled to the seller.
    OrderCompleted {
        /// The completed order.
        order_id: OrderId,
        /// The buyer whose escrow was debited.
        buyer: AccountId,
        /// The seller who was credited.
        seller: AccountId,
        /// The settled amount.
        amount: Amount,
    },

    /// Both parties cancelled; the escrow hold was refunded to the buyer.
    OrderCancelled {
        /// The cancelled order.
        order_id: OrderId,
        /// The refunded buyer.
        buyer: AccountId,
        /// The refunded amount.
        refund: Amount,
    },

    /// A participant made a voluntary deposit.
    DepositReceived {
        /// The credited account.
        account: AccountId,
        /// The deposited amount.
        amount: Amount,
    },

    /// A participant withdrew their accumulated balance.
    Withdrawal {
        /// The drained account.
        account: AccountId,
        /// The paid-out amount.
        amount: Amount,
    },
}

impl MarketEvent {
    /// Returns the event kind as a stable string.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ListingCreated { .. } => "listing_created",
            Self::ListingModified { .. } => "listing_modified",
            Self::OrderCreated { .. } => "order_created",
            Self::OrderCompleted { .. } => "order_completed",
            Self::OrderCancelled { .. } => "order_cancelled",
            Self::DepositReceived { .. } => "deposit_received",
            Self::Withdrawal { .. } => "withdrawal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::Keypair;

    #[test]
    fn event_kind_matches_variant() {
        let event = MarketEvent::ListingModified {
            listing_id: ListingId::new(),
        };
        assert_eq!(event.kind(), "listing_modified");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = MarketEvent::OrderCompleted {
            order_id: OrderId::new(),
            buyer: Keypair::generate().account_id().clone(),
            seller: Keypair::generate().account_id().clone(),
            amount: Amount::from_wei(1_000_000),
        };

        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "order_completed");

        let parsed: MarketEvent = serde_json::from_value(json).expect("deserialize");
        assert_eq!(event, parsed);
    }
}
