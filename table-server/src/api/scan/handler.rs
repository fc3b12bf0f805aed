//! Table scan handler

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::identity;
use crate::utils::AppResult;
use shared::session::SessionContext;

/// Scan request: the token read from the QR code plus whatever context the
/// client still holds from a prior visit
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub token: String,
    #[serde(default)]
    pub context: Option<SessionContext>,
}

/// Scan response
///
/// `is_occupied=true` asks the client to surface the join-shared-bill /
/// separate-bill choice. The returned context is the caller's held context
/// with the new session adopted (cross-table cart state discarded).
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub session_id: String,
    pub restaurant_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i64>,
    pub is_occupied: bool,
    pub context: SessionContext,
}

/// Resolve a scanned table code and start (or join) a session
pub async fn scan(
    State(state): State<ServerState>,
    Json(req): Json<ScanRequest>,
) -> AppResult<Json<ScanResponse>> {
    // Single-restaurant deployments resolve numeric codes without any
    // caller-held context
    let mut context = req.context.unwrap_or_default();
    if context.restaurant_id.is_none() {
        context.restaurant_id = Some(state.config.default_restaurant_id);
    }

    let target = identity::resolve_scan(&req.token, Some(&context))?;
    let outcome = state.sessions.start_session(&target)?;
    context.adopt_session(&outcome);

    Ok(Json(ScanResponse {
        session_id: outcome.session_id,
        restaurant_id: outcome.restaurant_id,
        table_number: outcome.table_number,
        is_occupied: outcome.is_occupied,
        context,
    }))
}
