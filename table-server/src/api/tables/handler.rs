//! Dining table registry handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::StaffClaims;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use shared::types::Role;

/// List the restaurant's tables
pub async fn list(
    claims: StaffClaims,
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = state.storage.list_tables(claims.restaurant_id())?;
    Ok(Json(tables))
}

/// Register a table (manager/owner)
pub async fn create(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    claims.require(Role::can_manage_settings)?;

    if state
        .storage
        .get_table_by_number(payload.restaurant_id, payload.number)?
        .is_some()
    {
        return Err(AppError::with_message(
            ErrorCode::AlreadyExists,
            format!("Table {} already exists", payload.number),
        ));
    }

    let table = DiningTable {
        id: uuid::Uuid::new_v4().to_string(),
        restaurant_id: payload.restaurant_id,
        number: payload.number,
        name: payload
            .name
            .unwrap_or_else(|| format!("Table {}", payload.number)),
        is_active: true,
    };
    state.storage.store_table(&table)?;
    tracing::info!(table_id = %table.id, number = table.number, "Dining table registered");
    Ok(Json(table))
}

/// Update a table (rename, enable/disable)
///
/// Disabling a table blocks new scans but does not end its active session.
pub async fn update(
    claims: StaffClaims,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    claims.require(Role::can_manage_settings)?;

    let mut table = state
        .storage
        .get_table(&id)?
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;
    if let Some(name) = payload.name {
        table.name = name;
    }
    if let Some(is_active) = payload.is_active {
        table.is_active = is_active;
    }
    state.storage.store_table(&table)?;
    Ok(Json(table))
}
