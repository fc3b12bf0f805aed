//! Order snapshot - the full current state of one order
//!
//! Every feed event and every API response carries the complete snapshot
//! (not a diff), so a consumer that missed intermediate events still
//! converges by applying the latest one.

use super::types::{AgeBucket, LineKey, LineStatus, OrderKind, OrderLine, OrderStatus};
use crate::types::{Timestamp, now_millis};
use serde::{Deserialize, Serialize};

/// One placed (or in-progress) basket tied to a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    /// Order ID (assigned by server)
    pub order_id: String,
    pub restaurant_id: i64,
    /// Owning session; None for takeaway orders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub kind: OrderKind,
    /// Separate-bill scope tag; None means the shared table bill
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_tag: Option<String>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub created_at: Timestamp,
    /// Set when the order left cart state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placed_at: Option<Timestamp>,
    pub updated_at: Timestamp,
    /// Load-adjusted preparation estimate, set on admission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_prep_minutes: Option<u32>,
    /// `placed_at + estimated_prep_minutes`, set on admission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_ready_at: Option<Timestamp>,
}

impl OrderSnapshot {
    /// Create a new empty cart order
    pub fn new_cart(restaurant_id: i64, session_id: String, bill_tag: Option<String>) -> Self {
        let now = now_millis();
        Self {
            order_id: uuid::Uuid::new_v4().to_string(),
            restaurant_id,
            session_id: Some(session_id),
            kind: OrderKind::DineIn,
            bill_tag,
            status: OrderStatus::Cart,
            lines: Vec::new(),
            created_at: now,
            placed_at: None,
            updated_at: now,
            estimated_prep_minutes: None,
            estimated_ready_at: None,
        }
    }

    /// Create a new empty takeaway cart (no table, no session)
    pub fn new_takeaway(restaurant_id: i64) -> Self {
        let now = now_millis();
        Self {
            order_id: uuid::Uuid::new_v4().to_string(),
            restaurant_id,
            session_id: None,
            kind: OrderKind::Takeaway,
            bill_tag: None,
            status: OrderStatus::Cart,
            lines: Vec::new(),
            created_at: now,
            placed_at: None,
            updated_at: now,
            estimated_prep_minutes: None,
            estimated_ready_at: None,
        }
    }

    pub fn is_cart(&self) -> bool {
        self.status == OrderStatus::Cart
    }

    /// Find a line by its composite key
    pub fn line(&self, key: &LineKey) -> Option<&OrderLine> {
        self.lines.iter().find(|l| &l.key() == key)
    }

    fn line_mut(&mut self, key: &LineKey) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|l| &l.key() == key)
    }

    /// Increment the line for `key` by one, creating it at quantity 1
    ///
    /// `unit_price`/`name`/`category` only apply when the line is created;
    /// an existing line keeps the price captured by its first add.
    pub fn increment_line(
        &mut self,
        key: &LineKey,
        name: &str,
        category: &str,
        unit_price: f64,
    ) -> &OrderLine {
        let idx = match self.lines.iter().position(|l| &l.key() == key) {
            Some(idx) => {
                self.lines[idx].quantity += 1;
                idx
            }
            None => {
                self.lines.push(OrderLine {
                    menu_item_id: key.menu_item_id.clone(),
                    variant_id: key.variant_id.clone(),
                    name: name.to_string(),
                    category: category.to_string(),
                    unit_price,
                    quantity: 1,
                    status: LineStatus::Pending,
                });
                self.lines.len() - 1
            }
        };
        self.touch();
        &self.lines[idx]
    }

    /// Decrement the line for `key` by one; quantity 0 removes the line.
    /// Decrementing an absent line is a no-op, never an error.
    pub fn decrement_line(&mut self, key: &LineKey) {
        if let Some(line) = self.line_mut(key) {
            line.quantity = line.quantity.saturating_sub(1);
            if line.quantity == 0 {
                self.lines.retain(|l| &l.key() != key);
            }
            self.touch();
        }
    }

    /// Delete the line outright regardless of quantity
    pub fn remove_line(&mut self, key: &LineKey) {
        let before = self.lines.len();
        self.lines.retain(|l| &l.key() != key);
        if self.lines.len() != before {
            self.touch();
        }
    }

    /// Cancel up to `quantity` units of an accepted line (staff path)
    ///
    /// Cancelling the full quantity keeps the line at quantity 0 with
    /// status `Rejected` so boards retain the audit trail.
    pub fn cancel_line_quantity(&mut self, key: &LineKey, quantity: u32) -> bool {
        let Some(line) = self.line_mut(key) else {
            return false;
        };
        line.quantity = line.quantity.saturating_sub(quantity);
        if line.quantity == 0 {
            line.status = LineStatus::Rejected;
        }
        self.touch();
        true
    }

    /// Billable subtotal (rejected lines excluded)
    pub fn subtotal(&self) -> f64 {
        round_cents(self.lines.iter().map(|l| l.line_total()).sum())
    }

    /// Count of billable items
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .filter(|l| l.status != LineStatus::Rejected)
            .map(|l| l.quantity)
            .sum()
    }

    /// Active item count per category, for capacity ceilings
    pub fn category_counts(&self) -> impl Iterator<Item = (&str, u32)> {
        self.lines
            .iter()
            .filter(|l| l.status != LineStatus::Rejected)
            .map(|l| (l.category.as_str(), l.quantity))
    }

    /// Display urgency bucket, derived on read
    pub fn age_bucket(&self, now: Timestamp) -> AgeBucket {
        AgeBucket::classify(self.created_at, now)
    }

    fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

/// Round to cents; order money is f64 with explicit cent rounding
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
