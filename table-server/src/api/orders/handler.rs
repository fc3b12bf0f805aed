//! Order board and transition handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::StaffClaims;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::order::{AgeBucket, LineKey, OrderSnapshot};
use shared::types::now_millis;

/// Order annotated with its display urgency, recomputed on every read
#[derive(Debug, Serialize)]
pub struct BoardOrder {
    #[serde(flatten)]
    pub order: OrderSnapshot,
    pub age: AgeBucket,
}

/// Active orders for the caller's restaurant (the poll backstop)
pub async fn active(
    claims: StaffClaims,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<BoardOrder>>> {
    let now = now_millis();
    let orders = state.ledger.active_orders(claims.restaurant_id())?;
    let board = orders
        .into_iter()
        .map(|order| BoardOrder {
            age: order.age_bucket(now),
            order,
        })
        .collect();
    Ok(Json(board))
}

/// Current snapshot of one order (customer status view)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    Ok(Json(state.ledger.get_order(&id)?))
}

/// Kitchen: mark an accepted order ready
pub async fn mark_ready(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    Ok(Json(state.ledger.mark_ready(claims.role(), &id)?))
}

/// Cashier: complete a ready order
pub async fn complete(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    Ok(Json(state.ledger.complete(claims.role(), &id)?))
}

/// Staff: cancel a pre-ready order
pub async fn cancel(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderSnapshot>> {
    Ok(Json(state.ledger.cancel_order(claims.role(), &id)?))
}

/// Cancel-item request
#[derive(Debug, Deserialize)]
pub struct CancelItemRequest {
    pub menu_item_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub quantity: u32,
}

/// Staff: cancel part or all of an accepted line (audited)
pub async fn cancel_item(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<CancelItemRequest>,
) -> AppResult<Json<OrderSnapshot>> {
    let key = LineKey::new(req.menu_item_id, req.variant_id);
    Ok(Json(state.ledger.cancel_order_item(
        claims.role(),
        &id,
        &key,
        req.quantity,
    )?))
}
