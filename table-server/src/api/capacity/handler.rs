//! Capacity settings handlers

use axum::{Json, extract::State};
use validator::Validate;

use crate::auth::StaffClaims;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};
use shared::models::{CapacitySettings, CapacitySettingsUpdate};
use shared::types::Role;

/// Current capacity settings for the caller's restaurant
pub async fn get_settings(
    claims: StaffClaims,
    State(state): State<ServerState>,
) -> AppResult<Json<CapacitySettings>> {
    Ok(Json(state.capacity.settings(claims.restaurant_id())))
}

/// Update capacity settings (manager/owner only, write-through cache)
pub async fn update_settings(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Json(update): Json<CapacitySettingsUpdate>,
) -> AppResult<Json<CapacitySettings>> {
    claims.require(Role::can_manage_settings)?;
    update
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let merged = state
        .capacity
        .update_settings(claims.restaurant_id(), &update)?;
    Ok(Json(merged))
}
