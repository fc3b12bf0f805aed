//! Kitchen capacity controller
//!
//! Admission control over new order acceptance, checked at finalize time
//! inside the same write transaction that commits the status change, so a
//! rejected finalize never partially commits.
//!
//! The controller never mutates orders; it only accepts or rejects
//! admission and supplies the ETA annotation for accepted orders.

use crate::storage::Storage;
use parking_lot::RwLock;
use redb::WriteTransaction;
use shared::models::{CapacitySettings, CapacitySettingsUpdate};
use shared::order::OrderSnapshot;
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

/// Upper bound on the load-derived ETA surcharge (minutes)
const MAX_PRESSURE_MINUTES: u32 = 45;

/// Capacity controller with a write-through settings cache
///
/// Reads are served from the in-process cache; staff writes go through
/// storage and replace the cached entry in the same call, so a pause takes
/// effect on the very next admission decision.
pub struct CapacityController {
    storage: Storage,
    cache: RwLock<HashMap<i64, CapacitySettings>>,
}

impl CapacityController {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Current settings for a restaurant (defaults when never configured)
    pub fn settings(&self, restaurant_id: i64) -> CapacitySettings {
        if let Some(settings) = self.cache.read().get(&restaurant_id) {
            return settings.clone();
        }
        let settings = self
            .storage
            .get_capacity(restaurant_id)
            .unwrap_or_else(|e| {
                tracing::error!(restaurant_id, error = %e, "Failed to load capacity settings, using defaults");
                None
            })
            .unwrap_or_default();
        self.cache
            .write()
            .insert(restaurant_id, settings.clone());
        settings
    }

    /// Apply a staff settings update (write-through, immediate invalidation)
    pub fn update_settings(
        &self,
        restaurant_id: i64,
        update: &CapacitySettingsUpdate,
    ) -> AppResult<CapacitySettings> {
        let merged = self.settings(restaurant_id).merged_with(update);
        self.storage.store_capacity(restaurant_id, &merged)?;
        self.cache.write().insert(restaurant_id, merged.clone());
        tracing::info!(
            restaurant_id,
            is_paused = merged.is_paused,
            max_active_orders = merged.max_active_orders,
            "Capacity settings updated"
        );
        Ok(merged)
    }

    /// Admission check for an order about to be finalized
    ///
    /// Returns the current active-order count on acceptance (input to the
    /// ETA computation). Checks run in order: pause flag, global active
    /// ceiling, then per-category ceilings.
    pub fn admit(&self, txn: &WriteTransaction, order: &OrderSnapshot) -> AppResult<u32> {
        let settings = self.settings(order.restaurant_id);

        if settings.is_paused {
            return Err(AppError::new(ErrorCode::KitchenPaused));
        }

        let active = self.storage.active_snapshots_txn(txn, order.restaurant_id)?;
        let active_count = active.len() as u32;
        if active_count >= settings.max_active_orders {
            return Err(AppError::with_message(
                ErrorCode::CapacityExceeded,
                format!(
                    "Kitchen is busy: {} active orders (limit {})",
                    active_count, settings.max_active_orders
                ),
            )
            .with_detail("active_orders", active_count)
            .with_detail("max_active_orders", settings.max_active_orders));
        }

        if !settings.category_limits.is_empty() {
            let mut in_flight: HashMap<&str, u32> = HashMap::new();
            for snapshot in &active {
                for (category, quantity) in snapshot.category_counts() {
                    *in_flight.entry(category).or_default() += quantity;
                }
            }
            for (category, quantity) in order.category_counts() {
                if let Some(&limit) = settings.category_limits.get(category) {
                    let current = in_flight.get(category).copied().unwrap_or(0);
                    if current + quantity > limit {
                        return Err(AppError::with_message(
                            ErrorCode::CategoryCapacityExceeded,
                            format!("Too many pending {} items right now", category),
                        )
                        .with_detail("category", category)
                        .with_detail("in_flight", current)
                        .with_detail("requested", quantity)
                        .with_detail("limit", limit));
                    }
                }
            }
        }

        Ok(active_count)
    }

    /// Load-adjusted preparation estimate for an admitted order
    ///
    /// Returns `(estimated_prep_minutes, estimated_ready_at)`.
    pub fn estimate(&self, restaurant_id: i64, active_count: u32, now: i64) -> (u32, i64) {
        let settings = self.settings(restaurant_id);
        let prep_minutes = settings.default_prep_minutes + pressure_minutes(active_count);
        let ready_at = now + (prep_minutes as i64) * 60_000;
        (prep_minutes, ready_at)
    }
}

/// ETA surcharge from current kitchen load
///
/// Monotonic non-decreasing in the active-order count and saturating at
/// [`MAX_PRESSURE_MINUTES`]; more load never decreases the estimate.
pub fn pressure_minutes(active_count: u32) -> u32 {
    (active_count / 2).min(MAX_PRESSURE_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::LineKey;

    fn controller() -> CapacityController {
        CapacityController::new(Storage::open_in_memory().unwrap())
    }

    fn cart_with(category: &str, quantity: u32) -> OrderSnapshot {
        let mut order = OrderSnapshot::new_cart(1, "s1".to_string(), None);
        let key = LineKey::new("item", None);
        for _ in 0..quantity {
            order.increment_line(&key, "Item", category, 10.0);
        }
        order
    }

    #[test]
    fn test_pressure_is_monotonic_and_saturating() {
        let mut last = 0;
        for n in 0..200 {
            let p = pressure_minutes(n);
            assert!(p >= last, "pressure decreased at {}", n);
            assert!(p <= MAX_PRESSURE_MINUTES);
            last = p;
        }
        assert_eq!(pressure_minutes(1000), MAX_PRESSURE_MINUTES);
    }

    #[test]
    fn test_paused_kitchen_rejects() {
        let ctl = controller();
        ctl.update_settings(
            1,
            &CapacitySettingsUpdate {
                is_paused: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let txn = ctl.storage.begin_write().unwrap();
        let err = ctl.admit(&txn, &cart_with("wok", 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::KitchenPaused);
        txn.commit().unwrap();
    }

    #[test]
    fn test_max_active_orders_ceiling() {
        let ctl = controller();
        ctl.update_settings(
            1,
            &CapacitySettingsUpdate {
                max_active_orders: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

        // One active order already in flight
        let mut active = cart_with("wok", 1);
        active.status = shared::order::OrderStatus::Accepted;
        let txn = ctl.storage.begin_write().unwrap();
        ctl.storage.store_order_txn(&txn, &active).unwrap();
        ctl.storage
            .mark_order_active_txn(&txn, 1, &active.order_id)
            .unwrap();
        txn.commit().unwrap();

        let txn = ctl.storage.begin_write().unwrap();
        let err = ctl.admit(&txn, &cart_with("wok", 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::CapacityExceeded);
        txn.commit().unwrap();
    }

    #[test]
    fn test_category_ceiling() {
        let ctl = controller();
        ctl.update_settings(
            1,
            &CapacitySettingsUpdate {
                category_limits: Some(HashMap::from([("grill".to_string(), 3)])),
                ..Default::default()
            },
        )
        .unwrap();

        let mut active = cart_with("grill", 2);
        active.status = shared::order::OrderStatus::Accepted;
        let txn = ctl.storage.begin_write().unwrap();
        ctl.storage.store_order_txn(&txn, &active).unwrap();
        ctl.storage
            .mark_order_active_txn(&txn, 1, &active.order_id)
            .unwrap();
        txn.commit().unwrap();

        // 2 in flight + 2 requested > 3
        let txn = ctl.storage.begin_write().unwrap();
        let err = ctl.admit(&txn, &cart_with("grill", 2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryCapacityExceeded);

        // A different category is unaffected
        assert!(ctl.admit(&txn, &cart_with("wok", 5)).is_ok());
        txn.commit().unwrap();
    }

    #[test]
    fn test_settings_update_takes_effect_immediately() {
        let ctl = controller();
        // Warm the cache
        assert!(!ctl.settings(1).is_paused);
        ctl.update_settings(
            1,
            &CapacitySettingsUpdate {
                is_paused: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        // No stale read: the very next admission sees the pause
        assert!(ctl.settings(1).is_paused);
    }

    #[test]
    fn test_estimate_grows_with_load() {
        let ctl = controller();
        let now = 1_700_000_000_000;
        let (prep_idle, ready_idle) = ctl.estimate(1, 0, now);
        let (prep_busy, _) = ctl.estimate(1, 20, now);
        assert_eq!(prep_idle, 15);
        assert_eq!(ready_idle, now + 15 * 60_000);
        assert_eq!(prep_busy, 25);
    }
}
