//! Cart mutation handlers
//!
//! Every mutation goes through the stale-reference combinator: a cached
//! `order_id` that turns out stale is dropped and the mutation retried
//! once against a freshly resolved cart order.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::core::ServerState;
use crate::orders::{CartRef, with_fresh_order};
use crate::utils::AppResult;
use shared::order::{LineKey, OrderSnapshot};

/// Shared shape of all cart mutations
#[derive(Debug, Deserialize)]
pub struct CartMutationRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    /// Client-cached open order id (fast path; may be stale)
    #[serde(default)]
    pub order_id: Option<String>,
    /// Separate-bill scope; omit for the shared table bill
    #[serde(default)]
    pub bill_tag: Option<String>,
    /// Client-generated id making retried requests replay-safe
    #[serde(default)]
    pub request_id: Option<String>,
    pub menu_item_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
}

impl CartMutationRequest {
    fn line_key(&self) -> LineKey {
        LineKey::new(self.menu_item_id.clone(), self.variant_id.clone())
    }

    fn cart_ref(&self, order_id: Option<&str>) -> CartRef {
        CartRef {
            session_id: self.session_id.clone(),
            order_id: order_id.map(|s| s.to_string()),
            bill_tag: self.bill_tag.clone(),
            request_id: self.request_id.clone(),
        }
    }
}

/// Add one unit to the cart
pub async fn add_item(
    State(state): State<ServerState>,
    Json(req): Json<CartMutationRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let key = req.line_key();
    let snapshot = with_fresh_order(req.order_id.clone(), |hint| {
        state.ledger.add_item(&req.cart_ref(hint), &key)
    })?;
    Ok(Json(snapshot))
}

/// Decrement one unit (floor 0)
pub async fn decrement_item(
    State(state): State<ServerState>,
    Json(req): Json<CartMutationRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let key = req.line_key();
    let snapshot = with_fresh_order(req.order_id.clone(), |hint| {
        state.ledger.decrement_item(&req.cart_ref(hint), &key)
    })?;
    Ok(Json(snapshot))
}

/// Remove the line outright
pub async fn remove_item(
    State(state): State<ServerState>,
    Json(req): Json<CartMutationRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let key = req.line_key();
    let snapshot = with_fresh_order(req.order_id.clone(), |hint| {
        state.ledger.remove_item(&req.cart_ref(hint), &key)
    })?;
    Ok(Json(snapshot))
}

/// Finalize request
#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub order_id: String,
}

/// Place the cart (admission-gated)
pub async fn finalize(
    State(state): State<ServerState>,
    Json(req): Json<FinalizeRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let snapshot = state.ledger.finalize(&req.order_id)?;
    Ok(Json(snapshot))
}

/// Takeaway request
#[derive(Debug, Deserialize)]
pub struct TakeawayRequest {
    #[serde(default)]
    pub restaurant_id: Option<i64>,
}

/// Open a takeaway cart (no table, no session)
pub async fn create_takeaway(
    State(state): State<ServerState>,
    Json(req): Json<TakeawayRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let restaurant_id = req
        .restaurant_id
        .unwrap_or(state.config.default_restaurant_id);
    let snapshot = state.ledger.create_takeaway(restaurant_id)?;
    Ok(Json(snapshot))
}
