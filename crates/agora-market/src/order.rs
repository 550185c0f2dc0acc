//! Order lifecycle state machine.
//!
//! An order is the record of one buyer's purchase of one listing. It opens
//! when payment is captured and reaches exactly one of two terminal states:
//! `Completed` (both parties approved; escrow settles to the seller) or
//! `Cancelled` (both parties cancelled; escrow refunds to the buyer).
//!
//! The two-party consent rule is a pure function over the four signal flags
//! ([`Order::resolution`]), so call order between the parties never matters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use agora_core::{AccountId, Amount};

use crate::error::{MarketError, Result};
use crate::listing::ListingId;

/// Unique order identifier.
///
/// Orders and listings draw from separate identifier spaces; an order id
/// never collides with any listing id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Create a new random order ID.
    #[must_use]
    pub fn new() -> Self {
        Self(format!("order-{}", Uuid::new_v4()))
    }

    /// Create from a string.
    #[must_use]
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the ID as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment captured; awaiting two-party resolution.
    Open,
    /// Both parties approved; escrow settled to the seller.
    Completed,
    /// Both parties cancelled; escrow refunded to the buyer.
    Cancelled,
}

impl OrderStatus {
    /// Check if the status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A party to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// The purchasing participant.
    Buyer,
    /// The listing's seller.
    Seller,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

/// A single party's signal toward resolving an open order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSignal {
    /// Set the party's approval flag. Approvals can be toggled while the
    /// order is open.
    Approval {
        /// The signaling party.
        party: Party,
        /// The flag value to record.
        approve: bool,
    },
    /// Record the party's cancellation intent. One-way.
    Cancellation {
        /// The signaling party.
        party: Party,
    },
}

impl OrderSignal {
    /// The party this signal belongs to.
    #[must_use]
    pub const fn party(&self) -> Party {
        match self {
            Self::Approval { party, .. } | Self::Cancellation { party } => *party,
        }
    }
}

/// Terminal outcome demanded by a matching pair of two-party signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Both parties approved: move the escrow hold to the seller.
    Settle,
    /// Both parties cancelled: refund the escrow hold to the buyer.
    Refund,
}

/// The in-progress or settled record of one purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order id.
    pub id: OrderId,
    /// The purchased listing.
    pub listing_id: ListingId,
    /// The listing's seller, fixed at creation.
    pub seller: AccountId,
    /// The purchasing participant, fixed at creation.
    pub buyer: AccountId,
    /// The listing price captured at purchase time.
    pub amount: Amount,
    /// Buyer's approval flag.
    pub buyer_approved: bool,
    /// Seller's approval flag.
    pub seller_approved: bool,
    /// Buyer's cancellation intent.
    pub buyer_cancelled: bool,
    /// Seller's cancellation intent.
    pub seller_cancelled: bool,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new open order with all signals cleared.
    #[must_use]
    pub fn new(listing_id: ListingId, seller: AccountId, buyer: AccountId, amount: Amount) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            listing_id,
            seller,
            buyer,
            amount,
            buyer_approved: false,
            seller_approved: false,
            buyer_cancelled: false,
            seller_cancelled: false,
            status: OrderStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the order is still open for signals.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.status, OrderStatus::Open)
    }

    /// The account acting as the given party on this order.
    #[must_use]
    pub const fn party_account(&self, party: Party) -> &AccountId {
        match party {
            Party::Buyer => &self.buyer,
            Party::Seller => &self.seller,
        }
    }

    /// Records a party's signal.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OrderFinalized`] if the order is no longer
    /// open.
    pub fn record(&mut self, signal: OrderSignal) -> Result<()> {
        if !self.is_open() {
            return Err(MarketError::OrderFinalized {
                id: self.id.clone(),
                status: self.status,
            });
        }
        match signal {
            OrderSignal::Approval {
                party: Party::Buyer,
                approve,
            } => self.buyer_approved = approve,
            OrderSignal::Approval {
                party: Party::Seller,
                approve,
            } => self.seller_approved = approve,
            OrderSignal::Cancellation {
                party: Party::Buyer,
            } => self.buyer_cancelled = true,
            OrderSignal::Cancellation {
                party: Party::Seller,
            } => self.seller_cancelled = true,
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// The terminal outcome demanded by the current signal flags, if any.
    ///
    /// Pure over the four flags; symmetric in the order the parties
    /// signaled.
    #[must_use]
    pub const fn resolution(&self) -> Option<Resolution> {
        if self.buyer_approved && self.seller_approved {
            return Some(Resolution::Settle);
        }
        if self.buyer_cancelled && self.seller_cancelled {
            return Some(Resolution::Refund);
        }
        None
    }

    /// The resolution this order would reach if the signal were recorded,
    /// without mutating it. Lets callers verify funds movement will succeed
    /// before committing anything.
    #[must_use]
    pub fn resolution_after(&self, signal: OrderSignal) -> Option<Resolution> {
        let mut probe = self.clone();
        probe.record(signal).ok()?;
        probe.resolution()
    }

    /// Transitions the order to `Completed`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OrderFinalized`] if the order is not open.
    pub fn complete(&mut self) -> Result<()> {
        self.finalize(OrderStatus::Completed)
    }

    /// Transitions the order to `Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OrderFinalized`] if the order is not open.
    pub fn cancel(&mut self) -> Result<()> {
        self.finalize(OrderStatus::Cancelled)
    }

    fn finalize(&mut self, status: OrderStatus) -> Result<()> {
        if !self.is_open() {
            return Err(MarketError::OrderFinalized {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }
}
