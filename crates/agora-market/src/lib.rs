//! # agora-market
//!
//! Settlement engine for the Agora peer-to-peer marketplace.
//!
//! This crate provides:
//!
//! - Listing catalog with per-seller indexing
//! - Escrow ledger for participant balances
//! - Order lifecycle state machine (dual-approval settlement,
//!   dual-party cancellation)
//! - Marketplace facade with typed notifications
//!
//! ## Example
//!
//! ```rust
//! use agora_core::{Amount, Keypair};
//! use agora_market::{ListingDetails, Marketplace};
//!
//! # async fn example() -> agora_market::Result<()> {
//! let market = Marketplace::new();
//! let seller = Keypair::generate();
//! let buyer = Keypair::generate();
//!
//! let listing_id = market
//!     .create_listing(
//!         seller.account_id(),
//!         ListingDetails {
//!             name: "Playstation 5".into(),
//!             description: "Brand New".into(),
//!             location: "Los Angeles, CA".into(),
//!             image_url: "https://example.com/ps5".into(),
//!             price: Amount::from_wei(1_000_000),
//!         },
//!     )
//!     .await?;
//!
//! let order_id = market
//!     .buy_item(buyer.account_id(), &listing_id, Amount::from_wei(1_000_000))
//!     .await?;
//!
//! // Settlement fires once both parties approve.
//! market
//!     .seller_approves_transaction(seller.account_id(), &order_id, true)
//!     .await?;
//! market
//!     .buyer_approves_transaction(buyer.account_id(), &order_id, true)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod events;
pub mod ledger;
pub mod listing;
pub mod market;
pub mod order;

pub use error::{MarketError, Result};
pub use events::MarketEvent;
pub use ledger::Ledger;
pub use listing::{Listing, ListingBook, ListingDetails, ListingId, ListingStatus};
pub use market::Marketplace;
pub use order::{Order, OrderId, OrderSignal, OrderStatus, Party, Resolution};
