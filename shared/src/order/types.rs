//! Order statuses, line items and derived display classification

use serde::{Deserialize, Serialize};

/// Order status state machine
///
/// ```text
/// CART ──▶ ACCEPTED ──▶ READY ──▶ COMPLETED
///   │          │
///   └──────────┴──▶ CANCELLED
/// ```
///
/// No backward transition exists; corrections are cancellation plus a new
/// order, never state reversal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Customer-mutable basket; not yet visible to the kitchen
    #[default]
    Cart,
    /// Admitted by the capacity controller; customer-immutable
    Accepted,
    /// Kitchen finished preparation
    Ready,
    /// Settled by cashier/staff
    Completed,
    /// Cancelled before completion
    Cancelled,
}

impl OrderStatus {
    /// Whether `self → next` is a legal state-machine move
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Cart, Self::Accepted)
                | (Self::Accepted, Self::Ready)
                | (Self::Ready, Self::Completed)
                | (Self::Cart, Self::Cancelled)
                | (Self::Accepted, Self::Cancelled)
        )
    }

    /// Active orders count against kitchen capacity
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Accepted | Self::Ready)
    }

    /// Terminal states can never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cart => "CART",
            Self::Accepted => "ACCEPTED",
            Self::Ready => "READY",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// Item-level sub-state for granular kitchen-to-cashier handoff
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Served,
}

/// Order kind: dine-in orders belong to a table session, takeaway orders
/// run through the same state machine without one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    #[default]
    DineIn,
    Takeaway,
}

/// Composite line key: one line per `(menu_item, variant)` pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub menu_item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl LineKey {
    pub fn new(menu_item_id: impl Into<String>, variant_id: Option<String>) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            variant_id,
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variant_id {
            Some(v) => write!(f, "{}/{}", self.menu_item_id, v),
            None => write!(f, "{}", self.menu_item_id),
        }
    }
}

/// One line in an order
///
/// `unit_price` is a snapshot captured at add-time; later catalog price
/// changes never alter already-stored lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub menu_item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// Item name snapshot (for boards and tickets)
    pub name: String,
    /// Category snapshot (for capacity ceilings and ticket routing)
    pub category: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub status: LineStatus,
}

impl OrderLine {
    pub fn key(&self) -> LineKey {
        LineKey::new(self.menu_item_id.clone(), self.variant_id.clone())
    }

    /// Line total; rejected lines never bill
    pub fn line_total(&self) -> f64 {
        if self.status == LineStatus::Rejected {
            0.0
        } else {
            self.unit_price * self.quantity as f64
        }
    }
}

/// Display urgency derived from order age; recomputed on read, never stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeBucket {
    /// 0–5 minutes
    New,
    /// 6–15 minutes
    Attention,
    /// over 15 minutes
    Delayed,
}

impl AgeBucket {
    /// Classify by elapsed time since `created_at` (both Unix millis)
    pub fn classify(created_at: i64, now: i64) -> Self {
        let minutes = (now - created_at).max(0) / 60_000;
        match minutes {
            0..=5 => Self::New,
            6..=15 => Self::Attention,
            _ => Self::Delayed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(OrderStatus::Cart.can_transition_to(OrderStatus::Accepted));
        assert!(OrderStatus::Accepted.can_transition_to(OrderStatus::Ready));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Cart.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Accepted.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_illegal_transitions() {
        // Backward moves are never legal
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Accepted));
        assert!(!OrderStatus::Accepted.can_transition_to(OrderStatus::Cart));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Ready));
        // Terminal states are dead ends
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Accepted));
        // Ready orders can no longer be cancelled, only completed
        assert!(!OrderStatus::Ready.can_transition_to(OrderStatus::Cancelled));
        // No skipping
        assert!(!OrderStatus::Cart.can_transition_to(OrderStatus::Ready));
        assert!(!OrderStatus::Accepted.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_active_states() {
        assert!(!OrderStatus::Cart.is_active());
        assert!(OrderStatus::Accepted.is_active());
        assert!(OrderStatus::Ready.is_active());
        assert!(!OrderStatus::Completed.is_active());
        assert!(!OrderStatus::Cancelled.is_active());
    }

    #[test]
    fn test_age_buckets() {
        let base = 1_700_000_000_000;
        assert_eq!(AgeBucket::classify(base, base), AgeBucket::New);
        assert_eq!(AgeBucket::classify(base, base + 5 * 60_000), AgeBucket::New);
        assert_eq!(
            AgeBucket::classify(base, base + 6 * 60_000),
            AgeBucket::Attention
        );
        assert_eq!(
            AgeBucket::classify(base, base + 15 * 60_000),
            AgeBucket::Attention
        );
        assert_eq!(
            AgeBucket::classify(base, base + 16 * 60_000),
            AgeBucket::Delayed
        );
        // Clock skew never panics
        assert_eq!(AgeBucket::classify(base, base - 1000), AgeBucket::New);
    }

    #[test]
    fn test_rejected_line_never_bills() {
        let mut line = OrderLine {
            menu_item_id: "x".to_string(),
            variant_id: None,
            name: "X".to_string(),
            category: "wok".to_string(),
            unit_price: 100.0,
            quantity: 2,
            status: LineStatus::Pending,
        };
        assert_eq!(line.line_total(), 200.0);
        line.status = LineStatus::Rejected;
        assert_eq!(line.line_total(), 0.0);
    }
}
