//! Kitchen capacity settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Restaurant-scoped capacity configuration (餐厅级容量配置)
///
/// Read by the capacity controller on every admission decision;
/// mutated only by staff with settings access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapacitySettings {
    /// Global intake pause flag
    pub is_paused: bool,
    /// Maximum concurrently active (accepted or ready) orders
    pub max_active_orders: u32,
    /// Base preparation estimate in minutes before load adjustment
    pub default_prep_minutes: u32,
    /// Per-category ceilings on concurrently active items
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub category_limits: HashMap<String, u32>,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            is_paused: false,
            max_active_orders: 40,
            default_prep_minutes: 15,
            category_limits: HashMap::new(),
        }
    }
}

/// Staff update payload for capacity settings
///
/// All fields optional; omitted fields keep their current value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct CapacitySettingsUpdate {
    pub is_paused: Option<bool>,
    #[validate(range(min = 1, max = 1000))]
    pub max_active_orders: Option<u32>,
    #[validate(range(min = 1, max = 240))]
    pub default_prep_minutes: Option<u32>,
    pub category_limits: Option<HashMap<String, u32>>,
}

impl CapacitySettings {
    /// Apply an update payload, returning the merged settings
    pub fn merged_with(&self, update: &CapacitySettingsUpdate) -> Self {
        Self {
            is_paused: update.is_paused.unwrap_or(self.is_paused),
            max_active_orders: update.max_active_orders.unwrap_or(self.max_active_orders),
            default_prep_minutes: update
                .default_prep_minutes
                .unwrap_or(self.default_prep_minutes),
            category_limits: update
                .category_limits
                .clone()
                .unwrap_or_else(|| self.category_limits.clone()),
        }
    }
}
