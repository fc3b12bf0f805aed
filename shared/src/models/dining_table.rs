//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (桌台)
///
/// `id` is the opaque identifier encoded into printed QR codes;
/// `(restaurant_id, number)` is the human-facing numeric address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: String,
    pub restaurant_id: i64,
    pub number: i64,
    pub name: String,
    pub is_active: bool,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub restaurant_id: i64,
    pub number: i64,
    pub name: Option<String>,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}
