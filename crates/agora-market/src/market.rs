//! Marketplace facade.
//!
//! [`Marketplace`] composes the listing catalog, the order state machine,
//! and the escrow ledger behind the caller-facing operations. Every public
//! operation runs inside one serializing critical section over the whole
//! market state: it validates, then mutates, then emits. No caller ever
//! observes a partially applied transition, and a failed operation leaves
//! all state unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info};

use agora_core::{AccountId, Amount};

use crate::error::{MarketError, Result};
use crate::events::MarketEvent;
use crate::ledger::Ledger;
use crate::listing::{Listing, ListingBook, ListingDetails, ListingId};
use crate::order::{Order, OrderId, OrderSignal, OrderStatus, Party, Resolution};

/// Buffered notifications per subscriber before lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// All mutable market state, guarded by one lock.
#[derive(Debug, Default)]
struct MarketState {
    listings: ListingBook,
    orders: HashMap<OrderId, Order>,
    ledger: Ledger,
}

/// The marketplace settlement engine.
///
/// Clone-cheap handle: clones share the same underlying state and event
/// channel.
#[derive(Debug, Clone)]
pub struct Marketplace {
    state: Arc<Mutex<MarketState>>,
    events: broadcast::Sender<MarketEvent>,
}

impl Marketplace {
    /// Creates an empty marketplace.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(MarketState::default())),
            events,
        }
    }

    /// Subscribes to the notification stream.
    ///
    /// Only events emitted after this call are delivered.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: MarketEvent) {
        // No subscribers is fine; the transition already committed.
        let _ = self.events.send(event);
    }

    /// Creates a listing for `seller`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidListing`] if a text field is blank.
    pub async fn create_listing(
        &self,
        seller: &AccountId,
        details: ListingDetails,
    ) -> Result<ListingId> {
        details.validate()?;

        let listing = Listing::new(seller.clone(), details);
        let listing_id = listing.id.clone();
        {
            let mut state = self.state.lock().await;
            state.listings.insert(listing);
        }

        info!(listing_id = %listing_id, seller = %seller, "listing created");
        self.emit(MarketEvent::ListingCreated {
            listing_id: listing_id.clone(),
            seller: seller.clone(),
        });
        Ok(listing_id)
    }

    /// Overwrites the editable fields of a listing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ListingNotFound`] for an unknown id,
    /// [`MarketError::Unauthorized`] unless `caller` is the seller, and
    /// [`MarketError::ListingUnavailable`] once the listing is purchased.
    pub async fn modify_listing(
        &self,
        caller: &AccountId,
        listing_id: &ListingId,
        details: ListingDetails,
    ) -> Result<ListingId> {
        details.validate()?;

        {
            let mut state = self.state.lock().await;
            let listing = state
                .listings
                .get_mut(listing_id)
                .ok_or_else(|| MarketError::ListingNotFound(listing_id.clone()))?;

            if &listing.seller != caller {
                return Err(MarketError::Unauthorized {
                    caller: caller.clone(),
                    action: "modify this listing".to_string(),
                });
            }
            if !listing.status.is_available() {
                return Err(MarketError::ListingUnavailable {
                    id: listing_id.clone(),
                    status: listing.status,
                });
            }
            listing.apply(details);
        }

        info!(listing_id = %listing_id, "listing modified");
        self.emit(MarketEvent::ListingModified {
            listing_id: listing_id.clone(),
        });
        Ok(listing_id.clone())
    }

    /// Purchases a listing, capturing `payment` as an escrow hold.
    ///
    /// The full payment is credited to the buyer's ledger balance; any
    /// excess over the price stays withdrawable by the buyer, and only the
    /// price moves at settlement.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ListingNotFound`] for an unknown id,
    /// [`MarketError::ListingUnavailable`] if already sold,
    /// [`MarketError::Unauthorized`] for a self-purchase, and
    /// [`MarketError::InsufficientPayment`] if `payment` is below the price.
    pub async fn buy_item(
        &self,
        buyer: &AccountId,
        listing_id: &ListingId,
        payment: Amount,
    ) -> Result<OrderId> {
        let order_id;
        let price;
        {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            let listing = state
                .listings
                .get_mut(listing_id)
                .ok_or_else(|| MarketError::ListingNotFound(listing_id.clone()))?;

            if !listing.status.is_available() {
                return Err(MarketError::ListingUnavailable {
                    id: listing_id.clone(),
                    status: listing.status,
                });
            }
            if &listing.seller == buyer {
                return Err(MarketError::Unauthorized {
                    caller: buyer.clone(),
                    action: "buy their own listing".to_string(),
                });
            }
            if payment < listing.price {
                return Err(MarketError::InsufficientPayment {
                    required: listing.price,
                    paid: payment,
                });
            }

            price = listing.price;
            let order = Order::new(
                listing_id.clone(),
                listing.seller.clone(),
                buyer.clone(),
                price,
            );
            order_id = order.id.clone();
            listing.mark_purchased(order_id.clone());
            state.ledger.credit(buyer, payment);
            state.orders.insert(order_id.clone(), order);
        }

        info!(
            order_id = %order_id,
            listing_id = %listing_id,
            buyer = %buyer,
            amount = %price,
            "order created; payment held in escrow"
        );
        self.emit(MarketEvent::OrderCreated {
            order_id: order_id.clone(),
            listing_id: listing_id.clone(),
            buyer: buyer.clone(),
        });
        Ok(order_id)
    }

    /// Records the seller's approval flag on an open order.
    ///
    /// Settlement fires the moment both parties' approvals are true.
    ///
    /// # Errors
    ///
    /// See [`Marketplace::buyer_approves_transaction`].
    pub async fn seller_approves_transaction(
        &self,
        caller: &AccountId,
        order_id: &OrderId,
        approve: bool,
    ) -> Result<OrderStatus> {
        self.apply_signal(
            caller,
            order_id,
            OrderSignal::Approval {
                party: Party::Seller,
                approve,
            },
        )
        .await
    }

    /// Records the buyer's approval flag on an open order.
    ///
    /// Settlement fires the moment both parties' approvals are true: the
    /// buyer's escrow hold is debited, the seller credited, and the order
    /// completed, all in one transition. A single-sided approval moves no
    /// funds.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OrderNotFound`] for an unknown id,
    /// [`MarketError::Unauthorized`] unless the caller is the respective
    /// party, and [`MarketError::OrderFinalized`] once the order left the
    /// open state.
    pub async fn buyer_approves_transaction(
        &self,
        caller: &AccountId,
        order_id: &OrderId,
        approve: bool,
    ) -> Result<OrderStatus> {
        self.apply_signal(
            caller,
            order_id,
            OrderSignal::Approval {
                party: Party::Buyer,
                approve,
            },
        )
        .await
    }

    /// Records the buyer's cancellation intent on an open order.
    ///
    /// Alone this moves no funds; the escrow hold stays in place until the
    /// seller concurs.
    ///
    /// # Errors
    ///
    /// See [`Marketplace::buyer_approves_transaction`].
    pub async fn buyer_cancel_order(
        &self,
        caller: &AccountId,
        order_id: &OrderId,
    ) -> Result<OrderStatus> {
        self.apply_signal(
            caller,
            order_id,
            OrderSignal::Cancellation {
                party: Party::Buyer,
            },
        )
        .await
    }

    /// Records the seller's cancellation intent on an open order.
    ///
    /// Once both parties have cancelled, the escrow hold is debited and
    /// refunded to the buyer, and the order is cancelled, all in one
    /// transition.
    ///
    /// # Errors
    ///
    /// See [`Marketplace::buyer_approves_transaction`].
    pub async fn seller_cancel_order(
        &self,
        caller: &AccountId,
        order_id: &OrderId,
    ) -> Result<OrderStatus> {
        self.apply_signal(
            caller,
            order_id,
            OrderSignal::Cancellation {
                party: Party::Seller,
            },
        )
        .await
    }

    async fn apply_signal(
        &self,
        caller: &AccountId,
        order_id: &OrderId,
        signal: OrderSignal,
    ) -> Result<OrderStatus> {
        let status;
        let event;
        {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            let order = state
                .orders
                .get_mut(order_id)
                .ok_or_else(|| MarketError::OrderNotFound(order_id.clone()))?;

            if order.party_account(signal.party()) != caller {
                return Err(MarketError::Unauthorized {
                    caller: caller.clone(),
                    action: format!("act as the {} on this order", signal.party()),
                });
            }
            if !order.is_open() {
                return Err(MarketError::OrderFinalized {
                    id: order_id.clone(),
                    status: order.status,
                });
            }

            match order.resolution_after(signal) {
                None => {
                    order.record(signal)?;
                    status = order.status;
                    event = None;
                }
                Some(Resolution::Settle) => {
                    let amount = order.amount;
                    let available = state.ledger.balance_of(&order.buyer);
                    if available < amount {
                        error!(
                            order_id = %order_id,
                            required = %amount,
                            available = %available,
                            "escrow hold missing at settlement; ledger invariant violated"
                        );
                        return Err(MarketError::InsufficientFunds {
                            required: amount,
                            available,
                        });
                    }

                    order.record(signal)?;
                    state.ledger.debit(&order.buyer, amount)?;
                    state.ledger.credit(&order.seller, amount);
                    order.complete()?;
                    status = order.status;
                    event = Some(MarketEvent::OrderCompleted {
                        order_id: order.id.clone(),
                        buyer: order.buyer.clone(),
                        seller: order.seller.clone(),
                        amount,
                    });
                }
                Some(Resolution::Refund) => {
                    let amount = order.amount;
                    let available = state.ledger.balance_of(&order.buyer);
                    if available < amount {
                        error!(
                            order_id = %order_id,
                            required = %amount,
                            available = %available,
                            "escrow hold missing at refund; ledger invariant violated"
                        );
                        return Err(MarketError::InsufficientFunds {
                            required: amount,
                            available,
                        });
                    }

                    order.record(signal)?;
                    // The refund leaves the ledger entirely; the environment
                    // pays it back out to the buyer.
                    state.ledger.debit(&order.buyer, amount)?;
                    order.cancel()?;
                    status = order.status;
                    event = Some(MarketEvent::OrderCancelled {
                        order_id: order.id.clone(),
                        buyer: order.buyer.clone(),
                        refund: amount,
                    });
                }
            }
        }

        match &event {
            Some(MarketEvent::OrderCompleted { amount, .. }) => {
                info!(order_id = %order_id, amount = %amount, "order completed; escrow settled to seller");
            }
            Some(MarketEvent::OrderCancelled { refund, .. }) => {
                info!(order_id = %order_id, refund = %refund, "order cancelled; escrow refunded to buyer");
            }
            _ => {
                debug!(order_id = %order_id, party = %signal.party(), "signal recorded; order still open");
            }
        }
        if let Some(event) = event {
            self.emit(event);
        }
        Ok(status)
    }

    /// Credits a voluntary deposit to `account` and returns the new
    /// balance. Touches no listing or order.
    pub async fn deposit(&self, account: &AccountId, amount: Amount) -> Amount {
        let balance = {
            let mut state = self.state.lock().await;
            state.ledger.credit(account, amount);
            state.ledger.balance_of(account)
        };

        info!(account = %account, amount = %amount, "deposit received");
        self.emit(MarketEvent::DepositReceived {
            account: account.clone(),
            amount,
        });
        balance
    }

    /// Pays out the caller's entire accumulated balance and returns it.
    ///
    /// Idempotent: withdrawing an empty balance returns zero and emits
    /// nothing.
    pub async fn withdraw(&self, account: &AccountId) -> Amount {
        let amount = {
            let mut state = self.state.lock().await;
            state.ledger.drain(account)
        };
        if amount.is_zero() {
            return amount;
        }

        info!(account = %account, amount = %amount, "balance withdrawn");
        self.emit(MarketEvent::Withdrawal {
            account: account.clone(),
            amount,
        });
        amount
    }

    /// The account's current ledger balance.
    pub async fn balance_of(&self, account: &AccountId) -> Amount {
        self.state.lock().await.ledger.balance_of(account)
    }

    /// The sum of all value currently held across every account.
    pub async fn contract_balance(&self) -> Amount {
        self.state.lock().await.ledger.total_held()
    }

    /// A snapshot of a listing.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ListingNotFound`] for an unknown id.
    pub async fn listing(&self, listing_id: &ListingId) -> Result<Listing> {
        self.state
            .lock()
            .await
            .listings
            .get(listing_id)
            .cloned()
            .ok_or_else(|| MarketError::ListingNotFound(listing_id.clone()))
    }

    /// A snapshot of an order.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::OrderNotFound`] for an unknown id.
    pub async fn order(&self, order_id: &OrderId) -> Result<Order> {
        self.state
            .lock()
            .await
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| MarketError::OrderNotFound(order_id.clone()))
    }

    /// The seller's listing ids in creation order.
    pub async fn seller_listings(&self, seller: &AccountId) -> Vec<ListingId> {
        self.state
            .lock()
            .await
            .listings
            .seller_listings(seller)
            .to_vec()
    }

    /// Number of the seller's listings still available for purchase.
    pub async fn live_listing_count(&self, seller: &AccountId) -> usize {
        self.state.lock().await.listings.live_listing_count(seller)
    }
}

impl Default for Marketplace {
    fn default() -> Self {
        Self::new()
    }
}
