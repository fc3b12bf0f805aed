//! OrderLedger - delta-based cart mutation and status transitions
//!
//! The ledger exclusively owns OrderItem mutation. Every mutation is a
//! delta against a `(order_id?, menu_item_id, variant_id)` key applied to
//! the currently stored line inside a serialized write transaction, so
//! near-simultaneous taps converge to the correct total instead of losing
//! updates.
//!
//! The capacity controller gates `finalize`; from the caller's view,
//! finalize and admission are one atomic decision. A rejected finalize
//! drops the uncommitted transaction, leaving the order bit-for-bit in
//! cart state.

use crate::capacity::CapacityController;
use crate::catalog::CatalogRef;
use crate::feed::OrderFeed;
use crate::orders::transitions;
use crate::storage::{Storage, StorageError};
use crate::ticket::{TicketPayload, TicketSink};
use redb::WriteTransaction;
use shared::order::{LineKey, LineStatus, OrderSnapshot, OrderStatus};
use shared::types::{Role, now_millis};
use shared::{AppError, AppResult, ErrorCode, FeedEvent};
use std::sync::Arc;

/// Caller-held cart addressing for a mutation
///
/// Mutations address either a cached `order_id` (fast path) or the
/// session's open cart (resolved, created lazily on first add). The
/// optional `request_id` makes a timed-out-and-retried mutation a no-op
/// replay instead of a double-apply.
#[derive(Debug, Clone, Default)]
pub struct CartRef {
    pub session_id: Option<String>,
    pub order_id: Option<String>,
    /// Separate-bill scope; None addresses the shared table cart
    pub bill_tag: Option<String>,
    pub request_id: Option<String>,
}

impl CartRef {
    /// Address a session's shared cart
    pub fn for_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    /// Address a specific order directly (takeaway, cached reference)
    pub fn for_order(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            ..Default::default()
        }
    }
}

/// The order mutation engine
pub struct OrderLedger {
    storage: Storage,
    catalog: CatalogRef,
    capacity: Arc<CapacityController>,
    feed: OrderFeed,
    tickets: Arc<dyn TicketSink>,
}

impl OrderLedger {
    pub fn new(
        storage: Storage,
        catalog: CatalogRef,
        capacity: Arc<CapacityController>,
        feed: OrderFeed,
        tickets: Arc<dyn TicketSink>,
    ) -> Self {
        Self {
            storage,
            catalog,
            capacity,
            feed,
            tickets,
        }
    }

    // ========== Cart Mutations (customer side) ==========

    /// Add one unit of `(menu_item, variant)` to the cart
    ///
    /// Creates the cart order lazily if the session has none; the write
    /// transaction serializes concurrent first-adds so exactly one order
    /// is created and the second caller attaches to it. The unit price is
    /// snapshotted from the catalog at add-time.
    pub fn add_item(&self, cart: &CartRef, key: &LineKey) -> AppResult<OrderSnapshot> {
        let item = self
            .catalog
            .get_item(&key.menu_item_id)
            .ok_or_else(|| AppError::not_found("Menu item"))?;
        let unit_price = item
            .price_for(key.variant_id.as_deref())
            .ok_or_else(|| AppError::not_found("Menu item variant"))?;

        let txn = self.storage.begin_write()?;
        if let Some(replayed) = self.check_replay(&txn, cart)? {
            return Ok(replayed);
        }

        let (mut order, created) = self.resolve_cart(&txn, cart)?;
        order.increment_line(key, &item.name, &item.category, unit_price);
        self.storage.store_order_txn(&txn, &order)?;
        self.mark_processed(&txn, cart)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(
            order_id = %order.order_id,
            line = %key,
            created_order = created,
            "Cart item added"
        );
        Ok(order)
    }

    /// Decrement one unit; quantity 0 removes the line, decrementing an
    /// absent line is a no-op
    pub fn decrement_item(&self, cart: &CartRef, key: &LineKey) -> AppResult<OrderSnapshot> {
        let txn = self.storage.begin_write()?;
        if let Some(replayed) = self.check_replay(&txn, cart)? {
            return Ok(replayed);
        }

        let (mut order, _) = self.resolve_cart(&txn, cart)?;
        order.decrement_line(key);
        self.storage.store_order_txn(&txn, &order)?;
        self.mark_processed(&txn, cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(order)
    }

    /// Delete a line outright regardless of quantity
    pub fn remove_item(&self, cart: &CartRef, key: &LineKey) -> AppResult<OrderSnapshot> {
        let txn = self.storage.begin_write()?;
        if let Some(replayed) = self.check_replay(&txn, cart)? {
            return Ok(replayed);
        }

        let (mut order, _) = self.resolve_cart(&txn, cart)?;
        order.remove_line(key);
        self.storage.store_order_txn(&txn, &order)?;
        self.mark_processed(&txn, cart)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(order)
    }

    // ========== Finalize (admission-gated) ==========

    /// Place the cart: `cart → accepted`, gated by kitchen admission
    ///
    /// A capacity rejection surfaces to the caller and leaves the order in
    /// cart state, items unchanged. A replayed finalize of an already
    /// accepted order is a no-op success.
    pub fn finalize(&self, order_id: &str) -> AppResult<OrderSnapshot> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        if order.status == OrderStatus::Accepted {
            return Ok(order);
        }
        if !order.is_cart() {
            return Err(AppError::invalid_transition(
                order.status.to_string(),
                OrderStatus::Accepted.to_string(),
            ));
        }
        if order.lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }

        let mut table_number = None;
        if let Some(session_id) = &order.session_id {
            let session = self
                .storage
                .get_session_txn(&txn, session_id)?
                .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;
            if !session.is_open() {
                return Err(AppError::new(ErrorCode::SessionClosed));
            }
            table_number = session.table_number;
        }

        let active_count = self.capacity.admit(&txn, &order)?;
        let now = now_millis();
        let (prep_minutes, ready_at) =
            self.capacity.estimate(order.restaurant_id, active_count, now);

        order.status = OrderStatus::Accepted;
        order.placed_at = Some(now);
        order.updated_at = now;
        order.estimated_prep_minutes = Some(prep_minutes);
        order.estimated_ready_at = Some(ready_at);

        self.storage.store_order_txn(&txn, &order)?;
        self.storage
            .mark_order_active_txn(&txn, order.restaurant_id, &order.order_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.order_id,
            items = order.item_count(),
            prep_minutes,
            "Order accepted"
        );
        self.feed.publish(FeedEvent::OrderCreated {
            snapshot: order.clone(),
        });
        self.tickets
            .deliver(TicketPayload::kitchen_copy(&order, table_number));
        Ok(order)
    }

    // ========== Status Transitions (staff side) ==========

    /// Kitchen: `accepted → ready`
    pub fn mark_ready(&self, role: Role, order_id: &str) -> AppResult<OrderSnapshot> {
        self.apply_transition(role, order_id, OrderStatus::Ready)
    }

    /// Cashier: `ready → completed`
    pub fn complete(&self, role: Role, order_id: &str) -> AppResult<OrderSnapshot> {
        self.apply_transition(role, order_id, OrderStatus::Completed)
    }

    /// Staff: cancel a pre-ready order
    pub fn cancel_order(&self, role: Role, order_id: &str) -> AppResult<OrderSnapshot> {
        self.apply_transition(role, order_id, OrderStatus::Cancelled)
    }

    fn apply_transition(
        &self,
        role: Role,
        order_id: &str,
        to: OrderStatus,
    ) -> AppResult<OrderSnapshot> {
        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        transitions::authorize_transition(role, order.status, to)?;

        let was_active = order.status.is_active();
        order.status = to;
        order.updated_at = now_millis();
        match to {
            // Kitchen acceptance ripples down to the line sub-states
            OrderStatus::Ready => {
                for line in &mut order.lines {
                    if line.status == LineStatus::Pending {
                        line.status = LineStatus::Accepted;
                    }
                }
            }
            OrderStatus::Completed => {
                for line in &mut order.lines {
                    if line.status != LineStatus::Rejected {
                        line.status = LineStatus::Served;
                    }
                }
            }
            _ => {}
        }

        self.storage.store_order_txn(&txn, &order)?;
        if was_active && !order.status.is_active() {
            self.storage
                .mark_order_inactive_txn(&txn, order.restaurant_id, &order.order_id)?;
        }
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id = %order.order_id, status = %order.status, role = %role, "Order status changed");
        self.feed.publish(FeedEvent::OrderUpdated {
            snapshot: order.clone(),
        });
        Ok(order)
    }

    /// Staff: cancel part or all of an already-accepted line
    ///
    /// Distinct from the customer's pre-placement decrement; this path is
    /// audited and restricted to cancel-capable roles.
    pub fn cancel_order_item(
        &self,
        role: Role,
        order_id: &str,
        key: &LineKey,
        quantity: u32,
    ) -> AppResult<OrderSnapshot> {
        if !role.can_cancel() {
            return Err(AppError::with_message(
                ErrorCode::RoleRequired,
                format!("Role {} may not cancel order items", role),
            ));
        }
        if quantity == 0 {
            return Err(AppError::invalid_request("quantity must be positive"));
        }

        let txn = self.storage.begin_write()?;
        let mut order = self
            .storage
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))?;

        match order.status {
            OrderStatus::Cart => {
                return Err(AppError::invalid_request(
                    "order is not placed yet, use the cart decrement instead",
                ));
            }
            OrderStatus::Completed | OrderStatus::Cancelled => {
                return Err(AppError::with_message(
                    ErrorCode::InvalidTransition,
                    format!("Cannot cancel items on a {} order", order.status),
                ));
            }
            OrderStatus::Accepted | OrderStatus::Ready => {}
        }

        if !order.cancel_line_quantity(key, quantity) {
            return Err(AppError::with_message(
                ErrorCode::LineNotFound,
                format!("Line {} not found on order {}", key, order_id),
            ));
        }
        self.storage.store_order_txn(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.order_id,
            line = %key,
            quantity,
            role = %role,
            "Order line cancelled"
        );
        self.feed.publish(FeedEvent::OrderUpdated {
            snapshot: order.clone(),
        });
        Ok(order)
    }

    // ========== Takeaway ==========

    /// Create a takeaway cart: same state machine, no table or session
    pub fn create_takeaway(&self, restaurant_id: i64) -> AppResult<OrderSnapshot> {
        let order = OrderSnapshot::new_takeaway(restaurant_id);
        let txn = self.storage.begin_write()?;
        self.storage.store_order_txn(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;
        tracing::debug!(order_id = %order.order_id, "Takeaway cart created");
        Ok(order)
    }

    // ========== Queries ==========

    /// Kitchen-active orders (the poll backstop for displays)
    pub fn active_orders(&self, restaurant_id: i64) -> AppResult<Vec<OrderSnapshot>> {
        Ok(self.storage.active_orders(restaurant_id)?)
    }

    /// Load one order snapshot
    pub fn get_order(&self, order_id: &str) -> AppResult<OrderSnapshot> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| AppError::order_not_found(order_id))
    }

    // ========== Internals ==========

    /// Resolve the cart order a mutation addresses, creating it lazily
    ///
    /// A cached `order_id` pointing at a vanished or no-longer-cart order
    /// yields the recoverable `OrderNotFound`; a closed session is
    /// terminal and yields `SessionClosed`.
    fn resolve_cart(
        &self,
        txn: &WriteTransaction,
        cart: &CartRef,
    ) -> AppResult<(OrderSnapshot, bool)> {
        if let Some(order_id) = &cart.order_id {
            let order = self
                .storage
                .get_order_txn(txn, order_id)?
                .ok_or_else(|| AppError::order_not_found(order_id.clone()))?;
            if let Some(session_id) = &order.session_id {
                let session = self
                    .storage
                    .get_session_txn(txn, session_id)?
                    .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;
                if !session.is_open() {
                    return Err(AppError::new(ErrorCode::SessionClosed));
                }
            }
            if !order.is_cart() {
                // The cart this reference pointed at is gone (finalized or
                // cancelled); the caller should start a fresh one
                return Err(AppError::order_not_found(order_id.clone()));
            }
            return Ok((order, false));
        }

        let session_id = cart
            .session_id
            .as_deref()
            .ok_or_else(|| AppError::invalid_request("session_id or order_id required"))?;
        let session = self
            .storage
            .get_session_txn(txn, session_id)?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;
        if !session.is_open() {
            return Err(AppError::new(ErrorCode::SessionClosed));
        }

        if let Some(order) =
            self.storage
                .find_open_cart_txn(txn, session_id, cart.bill_tag.as_deref())?
        {
            return Ok((order, false));
        }

        let order = OrderSnapshot::new_cart(
            session.restaurant_id,
            session_id.to_string(),
            cart.bill_tag.clone(),
        );
        self.storage
            .link_session_order_txn(txn, session_id, &order.order_id)?;
        Ok((order, true))
    }

    /// Replay dedup: a mutation whose `request_id` was already processed
    /// returns the current cart state without reapplying the delta
    fn check_replay(
        &self,
        txn: &WriteTransaction,
        cart: &CartRef,
    ) -> AppResult<Option<OrderSnapshot>> {
        let Some(request_id) = &cart.request_id else {
            return Ok(None);
        };
        if !self.storage.is_request_processed_txn(txn, request_id)? {
            return Ok(None);
        }
        tracing::debug!(request_id = %request_id, "Replayed cart mutation, returning current state");
        let existing = match (&cart.order_id, &cart.session_id) {
            (Some(order_id), _) => self.storage.get_order_txn(txn, order_id)?,
            (None, Some(session_id)) => {
                self.storage
                    .find_open_cart_txn(txn, session_id, cart.bill_tag.as_deref())?
            }
            (None, None) => None,
        };
        existing
            .map(Some)
            .ok_or_else(|| AppError::order_not_found("replayed request"))
    }

    fn mark_processed(&self, txn: &WriteTransaction, cart: &CartRef) -> AppResult<()> {
        if let Some(request_id) = &cart.request_id {
            self.storage.mark_request_processed_txn(txn, request_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, StaticCatalog};
    use crate::ticket::LogTicketSink;
    use shared::models::{CapacitySettingsUpdate, MenuItem, MenuVariant};
    use shared::session::TableSession;

    struct Fixture {
        ledger: OrderLedger,
        storage: Storage,
        catalog: Arc<StaticCatalog>,
        capacity: Arc<CapacityController>,
        session_id: String,
    }

    fn fixture() -> Fixture {
        let storage = Storage::open_in_memory().unwrap();
        let catalog = Arc::new(StaticCatalog::new());
        catalog.upsert(MenuItem {
            id: "noodles".to_string(),
            name: "Noodles".to_string(),
            price: 80.0,
            category: "wok".to_string(),
            variants: vec![MenuVariant {
                id: "large".to_string(),
                name: "Large".to_string(),
                price: 95.0,
            }],
        });
        catalog.upsert(MenuItem {
            id: "tea".to_string(),
            name: "Tea".to_string(),
            price: 5.0,
            category: "drinks".to_string(),
            variants: vec![],
        });

        let capacity = Arc::new(CapacityController::new(storage.clone()));
        let ledger = OrderLedger::new(
            storage.clone(),
            catalog.clone() as CatalogRef,
            capacity.clone(),
            OrderFeed::new(),
            Arc::new(LogTicketSink),
        );

        // Seed an open session for table 7
        let session = TableSession::open(1, Some(7), "t-7".to_string());
        let session_id = session.session_id.clone();
        let txn = storage.begin_write().unwrap();
        storage.store_session_txn(&txn, &session).unwrap();
        storage
            .set_active_session_txn(&txn, "t-7", &session_id)
            .unwrap();
        txn.commit().unwrap();

        Fixture {
            ledger,
            storage,
            catalog,
            capacity,
            session_id,
        }
    }

    fn noodles() -> LineKey {
        LineKey::new("noodles", None)
    }

    #[test]
    fn test_first_add_creates_single_order() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);

        let o1 = f.ledger.add_item(&cart, &noodles()).unwrap();
        let o2 = f.ledger.add_item(&cart, &noodles()).unwrap();

        assert_eq!(o1.order_id, o2.order_id);
        assert_eq!(o2.line(&noodles()).unwrap().quantity, 2);
        assert_eq!(f.storage.orders_for_session(&f.session_id).unwrap().len(), 1);
    }

    #[test]
    fn test_n_adds_yield_quantity_n() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        for _ in 0..7 {
            f.ledger.add_item(&cart, &noodles()).unwrap();
        }
        let order = &f.storage.orders_for_session(&f.session_id).unwrap()[0];
        assert_eq!(order.line(&noodles()).unwrap().quantity, 7);
    }

    #[test]
    fn test_replayed_request_id_applies_once() {
        let f = fixture();
        let mut cart = CartRef::for_session(&f.session_id);
        cart.request_id = Some("req-1".to_string());

        let first = f.ledger.add_item(&cart, &noodles()).unwrap();
        assert_eq!(first.line(&noodles()).unwrap().quantity, 1);

        // Timed-out client retries the identical request
        let replay = f.ledger.add_item(&cart, &noodles()).unwrap();
        assert_eq!(replay.line(&noodles()).unwrap().quantity, 1);
    }

    #[test]
    fn test_price_snapshot_stable_under_catalog_change() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        f.ledger.add_item(&cart, &noodles()).unwrap();

        f.catalog.set_price("noodles", 999.0);
        let order = f.ledger.add_item(&cart, &noodles()).unwrap();

        // The stored line keeps the price captured at first add
        assert_eq!(order.line(&noodles()).unwrap().unit_price, 80.0);
    }

    #[test]
    fn test_variant_price_snapshot() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        let large = LineKey::new("noodles", Some("large".to_string()));
        let order = f.ledger.add_item(&cart, &large).unwrap();
        assert_eq!(order.line(&large).unwrap().unit_price, 95.0);
    }

    #[test]
    fn test_unknown_item_and_variant_rejected() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        let err = f
            .ledger
            .add_item(&cart, &LineKey::new("ghost", None))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = f
            .ledger
            .add_item(&cart, &LineKey::new("tea", Some("xl".to_string())))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_decrement_floor_via_ledger() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        f.ledger.add_item(&cart, &noodles()).unwrap();

        let order = f.ledger.decrement_item(&cart, &noodles()).unwrap();
        assert!(order.line(&noodles()).is_none());

        // Absent line: no-op, never negative
        let order = f.ledger.decrement_item(&cart, &noodles()).unwrap();
        assert!(order.lines.is_empty());
    }

    #[test]
    fn test_stale_order_reference_recovery() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        let placed = f.ledger.add_item(&cart, &noodles()).unwrap();
        f.ledger.finalize(&placed.order_id).unwrap();

        // The cached reference now points at an accepted order
        let stale = CartRef {
            session_id: Some(f.session_id.clone()),
            order_id: Some(placed.order_id.clone()),
            ..Default::default()
        };
        let err = f.ledger.add_item(&stale, &noodles()).unwrap_err();
        assert!(err.is_stale_reference());

        // The combinator retries once without the hint and lands in a
        // fresh cart order
        let fresh = crate::orders::with_fresh_order(stale.order_id.clone(), |hint| {
            let cart = CartRef {
                session_id: Some(f.session_id.clone()),
                order_id: hint.map(|s| s.to_string()),
                ..Default::default()
            };
            f.ledger.add_item(&cart, &noodles())
        })
        .unwrap();
        assert_ne!(fresh.order_id, placed.order_id);
        assert_eq!(fresh.status, OrderStatus::Cart);
        assert_eq!(fresh.line(&noodles()).unwrap().quantity, 1);
    }

    #[test]
    fn test_finalize_sets_eta_and_activates() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        f.ledger.add_item(&cart, &noodles()).unwrap();
        let order = f.ledger.add_item(&cart, &noodles()).unwrap();

        let accepted = f.ledger.finalize(&order.order_id).unwrap();
        assert_eq!(accepted.status, OrderStatus::Accepted);
        assert!(accepted.placed_at.is_some());
        assert_eq!(accepted.estimated_prep_minutes, Some(15));
        assert!(accepted.estimated_ready_at.is_some());
        assert_eq!(f.ledger.active_orders(1).unwrap().len(), 1);

        // Replayed finalize is a no-op success
        let again = f.ledger.finalize(&order.order_id).unwrap();
        assert_eq!(again.status, OrderStatus::Accepted);
    }

    #[test]
    fn test_finalize_empty_cart_rejected() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        let order = f.ledger.add_item(&cart, &noodles()).unwrap();
        f.ledger.decrement_item(&cart, &noodles()).unwrap();

        let err = f.ledger.finalize(&order.order_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn test_paused_kitchen_leaves_cart_unchanged() {
        let f = fixture();
        f.capacity
            .update_settings(
                1,
                &CapacitySettingsUpdate {
                    is_paused: Some(true),
                    ..Default::default()
                },
            )
            .unwrap();

        let cart = CartRef::for_session(&f.session_id);
        let order = f.ledger.add_item(&cart, &noodles()).unwrap();
        let err = f.ledger.finalize(&order.order_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::KitchenPaused);

        let unchanged = f.ledger.get_order(&order.order_id).unwrap();
        assert_eq!(unchanged.status, OrderStatus::Cart);
        assert_eq!(unchanged.line(&noodles()).unwrap().quantity, 1);
        assert!(unchanged.estimated_ready_at.is_none());
        assert!(f.ledger.active_orders(1).unwrap().is_empty());
    }

    #[test]
    fn test_admission_recovers_after_completion() {
        let f = fixture();
        f.capacity
            .update_settings(
                1,
                &CapacitySettingsUpdate {
                    max_active_orders: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();

        let cart = CartRef::for_session(&f.session_id);
        let first_cart = f.ledger.add_item(&cart, &noodles()).unwrap();
        let first = f.ledger.finalize(&first_cart.order_id).unwrap();

        // Second order blocked at the ceiling
        let second_id = f.ledger.add_item(&cart, &noodles()).unwrap().order_id;
        let err = f.ledger.finalize(&second_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::CapacityExceeded);

        // Completing the first frees capacity; the same unchanged order
        // then finalizes successfully
        f.ledger.mark_ready(Role::Kitchen, &first.order_id).unwrap();
        f.ledger.complete(Role::Cashier, &first.order_id).unwrap();
        let accepted = f.ledger.finalize(&second_id).unwrap();
        assert_eq!(accepted.status, OrderStatus::Accepted);
    }

    #[test]
    fn test_transition_roles_and_staleness() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        f.ledger.add_item(&cart, &noodles()).unwrap();
        let order_id = f
            .storage
            .orders_for_session(&f.session_id)
            .unwrap()[0]
            .order_id
            .clone();
        f.ledger.finalize(&order_id).unwrap();

        // Cashier cannot mark ready
        let err = f.ledger.mark_ready(Role::Cashier, &order_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);

        f.ledger.mark_ready(Role::Kitchen, &order_id).unwrap();
        f.ledger.complete(Role::Cashier, &order_id).unwrap();

        // Stale mark-ready after completion is rejected, not reapplied
        let err = f.ledger.mark_ready(Role::Kitchen, &order_id).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTransition);

        // Completed orders left the active index
        assert!(f.ledger.active_orders(1).unwrap().is_empty());
    }

    #[test]
    fn test_line_substates_follow_order() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        f.ledger.add_item(&cart, &noodles()).unwrap();
        let order_id = f
            .storage
            .orders_for_session(&f.session_id)
            .unwrap()[0]
            .order_id
            .clone();
        let accepted = f.ledger.finalize(&order_id).unwrap();
        assert_eq!(accepted.lines[0].status, LineStatus::Pending);

        let ready = f.ledger.mark_ready(Role::Kitchen, &order_id).unwrap();
        assert_eq!(ready.lines[0].status, LineStatus::Accepted);

        let done = f.ledger.complete(Role::Cashier, &order_id).unwrap();
        assert_eq!(done.lines[0].status, LineStatus::Served);
    }

    #[test]
    fn test_cancel_order_item_staff_only() {
        let f = fixture();
        let cart = CartRef::for_session(&f.session_id);
        f.ledger.add_item(&cart, &noodles()).unwrap();
        let order = f.ledger.add_item(&cart, &noodles()).unwrap();

        // Pre-placement: the staff path refuses carts
        let err = f
            .ledger
            .cancel_order_item(Role::Cashier, &order.order_id, &noodles(), 1)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);

        f.ledger.finalize(&order.order_id).unwrap();

        let err = f
            .ledger
            .cancel_order_item(Role::Kitchen, &order.order_id, &noodles(), 1)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RoleRequired);

        let after = f
            .ledger
            .cancel_order_item(Role::Cashier, &order.order_id, &noodles(), 1)
            .unwrap();
        assert_eq!(after.line(&noodles()).unwrap().quantity, 1);

        let after = f
            .ledger
            .cancel_order_item(Role::Manager, &order.order_id, &noodles(), 1)
            .unwrap();
        assert_eq!(after.line(&noodles()).unwrap().status, LineStatus::Rejected);
        assert_eq!(after.subtotal(), 0.0);
    }

    #[test]
    fn test_separate_bill_gets_own_cart() {
        let f = fixture();
        let shared_cart = CartRef::for_session(&f.session_id);
        let separate_cart = CartRef {
            session_id: Some(f.session_id.clone()),
            bill_tag: Some("party-a".to_string()),
            ..Default::default()
        };

        let o1 = f.ledger.add_item(&shared_cart, &noodles()).unwrap();
        let o2 = f.ledger.add_item(&separate_cart, &noodles()).unwrap();
        assert_ne!(o1.order_id, o2.order_id);
        assert_eq!(o2.bill_tag.as_deref(), Some("party-a"));
        // Both live on the same session
        assert_eq!(o1.session_id, o2.session_id);
    }

    #[test]
    fn test_takeaway_flows_through_same_machine() {
        let f = fixture();
        let takeaway = f.ledger.create_takeaway(1).unwrap();
        assert!(takeaway.session_id.is_none());

        let cart = CartRef::for_order(&takeaway.order_id);
        f.ledger.add_item(&cart, &noodles()).unwrap();
        let accepted = f.ledger.finalize(&takeaway.order_id).unwrap();
        assert_eq!(accepted.status, OrderStatus::Accepted);
        f.ledger
            .mark_ready(Role::Kitchen, &takeaway.order_id)
            .unwrap();
        f.ledger
            .complete(Role::Cashier, &takeaway.order_id)
            .unwrap();
    }
}
