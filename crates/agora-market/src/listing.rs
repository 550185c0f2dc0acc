//! Listing catalog with per-seller indexing.
//!
//! Listings are never deleted; a sold listing stays in the catalog as the
//! audit record of its sale, linked to the order that settled or cancelled
//! it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use agora_core::{AccountId, Amount};

use crate::error::{MarketError, Result};
use crate::order::OrderId;

/// Unique listing identifier.
///
/// Listings and orders draw from separate identifier spaces; a listing id
/// never collides with any order id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(String);

impl ListingId {
    /// Create a new random listing ID.
    #[must_use]
    pub fn new() -> Self {
        Self(format!("listing-{}", Uuid::new_v4()))
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

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listing lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Listed and open for purchase.
    Available,
    /// Bought; terms are frozen and an order is in flight or settled.
    Purchased,
}

impl ListingStatus {
    /// Whether the listing can still be bought or modified.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Purchased => write!(f, "purchased"),
        }
    }
}

/// The seller-editable fields of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Where the item is located.
    pub location: String,
    /// Image URL for the item.
    pub image_url: String,
    /// Asking price in wei.
    pub price: Amount,
}

impl ListingDetails {
    /// Validates the text fields.
    ///
    /// The price needs no check: amounts are non-negative by construction.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidListing`] naming the first blank field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("location", &self.location),
            ("image_url", &self.image_url),
        ] {
            if value.trim().is_empty() {
                return Err(MarketError::InvalidListing(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// A seller's for-sale item record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing id, assigned at creation and never reused.
    pub id: ListingId,
    /// The creating participant. Immutable.
    pub seller: AccountId,
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Where the item is located.
    pub location: String,
    /// Image URL for the item.
    pub image_url: String,
    /// Asking price in wei.
    pub price: Amount,
    /// Current lifecycle status.
    pub status: ListingStatus,
    /// The active order, set exactly once when the listing is purchased.
    pub order_id: Option<OrderId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Creates a new available listing with a fresh id.
    #[must_use]
    pub fn new(seller: AccountId, details: ListingDetails) -> Self {
        let now = Utc::now();
        Self {
            id: ListingId::new(),
            seller,
            name: details.name,
            description: details.description,
            location: details.location,
            image_url: details.image_url,
            price: details.price,
            status: ListingStatus::Available,
            order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the seller-editable fields in place.
    pub fn apply(&mut self, details: ListingDetails) {
        self.name = details.name;
        self.description = details.description;
        self.location = details.location;
        self.image_url = details.image_url;
        self.price = details.price;
        self.updated_at = Utc::now();
    }

    /// Marks the listing purchased and links the order. Happens exactly
    /// once in a listing's life.
    pub fn mark_purchased(&mut self, order_id: OrderId) {
        self.status = ListingStatus::Purchased;
        self.order_id = Some(order_id);
        self.updated_at = Utc::now();
    }
}

/// Catalog of listings, keyed by id and indexed per seller.
#[derive(Debug, Default)]
pub struct ListingBook {
    listings: HashMap<ListingId, Listing>,
    by_seller: HashMap<AccountId, Vec<ListingId>>,
}

impl ListingBook {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a listing and appends it to its seller's index.
    pub fn insert(&mut self, listing: Listing) {
        self.by_seller
            .entry(listing.seller.clone())
            .or_default()
            .push(listing.id.clone());
        self.listings.insert(listing.id.clone(), listing);
    }

    /// Gets a listing by ID.
    #[must_use]
    pub fn get(&self, id: &ListingId) -> Option<&Listing> {
        self.listings.get(id)
    }

    /// Gets a mutable listing by ID.
    pub fn get_mut(&mut self, id: &ListingId) -> Option<&mut Listing> {
        self.listings.get_mut(id)
    }

    /// A seller's listing ids in creation order.
    #[must_use]
    pub fn seller_listings(&self, seller: &AccountId) -> &[ListingId] {
        self.by_seller.get(seller).map_or(&[], Vec::as_slice)
    }

    /// Number of the seller's listings still available for purchase.
    #[must_use]
    pub fn live_listing_count(&self, seller: &AccountId) -> usize {
        self.seller_listings(seller)
            .iter()
            .filter_map(|id| self.listings.get(id))
            .filter(|listing| listing.status.is_available())
            .count()
    }

    /// Total number of listings ever created.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
