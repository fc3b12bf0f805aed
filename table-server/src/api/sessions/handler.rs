//! Session close-out handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::StaffClaims;
use crate::billing::BillScope;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::session::TableSession;
use shared::types::Role;

/// Due query: `?bill_tag=party-a` scopes to one separate bill,
/// `?scope=shared` to the shared table bill, default is the whole session
#[derive(Debug, Deserialize)]
pub struct DueQuery {
    #[serde(default)]
    pub bill_tag: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Due response
#[derive(Debug, Serialize)]
pub struct DueResponse {
    pub session_id: String,
    pub due: f64,
}

/// Current due amount for a session
pub async fn due(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<DueQuery>,
) -> AppResult<Json<DueResponse>> {
    let scope = match (&query.bill_tag, query.scope.as_deref()) {
        (Some(tag), _) => BillScope::Party(tag),
        (None, Some("shared")) => BillScope::SharedBill,
        _ => BillScope::Session,
    };
    let due = state.sessions.compute_due(&id, scope)?;
    Ok(Json(DueResponse {
        session_id: id,
        due,
    }))
}

/// Close request
#[derive(Debug, Deserialize)]
pub struct CloseRequest {
    #[serde(default)]
    pub mark_paid: bool,
    #[serde(default)]
    pub payment_mode: Option<String>,
    /// Staff acknowledgement for closing with outstanding due
    #[serde(default)]
    pub force: bool,
}

/// Close a session (cashier and above); idempotent
pub async fn close(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<CloseRequest>,
) -> AppResult<Json<TableSession>> {
    claims.require(Role::can_settle)?;
    let session = state
        .sessions
        .end_session(&id, req.mark_paid, req.payment_mode, req.force)?;
    Ok(Json(session))
}
