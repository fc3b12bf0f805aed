//! Feed events pushed to subscribed displays
//!
//! Each event carries the full current order snapshot, so a client that
//! missed intermediate events converges by applying the latest one
//! (last-write-wins on `order_id`). Delivery is at-most-once per
//! connection; the active-orders poll is the correctness backstop.

use crate::order::OrderSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Event kinds on the order feed
///
/// A tagged union dispatched through [`apply_event`]; adding a kind is a
/// compile-time-checked change, not a string comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FeedEvent {
    OrderCreated { snapshot: OrderSnapshot },
    OrderUpdated { snapshot: OrderSnapshot },
}

impl FeedEvent {
    /// The snapshot carried by this event
    pub fn snapshot(&self) -> &OrderSnapshot {
        match self {
            Self::OrderCreated { snapshot } | Self::OrderUpdated { snapshot } => snapshot,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.snapshot().order_id
    }
}

/// Reconcile a feed event into a display-side order cache
///
/// Last-write-wins on `order_id`: later snapshots replace earlier ones,
/// and terminal orders are dropped from the active view.
pub fn apply_event(cache: &mut HashMap<String, OrderSnapshot>, event: &FeedEvent) {
    let snapshot = event.snapshot();
    if snapshot.status.is_terminal() {
        cache.remove(&snapshot.order_id);
    } else {
        cache.insert(snapshot.order_id.clone(), snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus;

    fn snapshot(order_id: &str, status: OrderStatus) -> OrderSnapshot {
        let mut s = OrderSnapshot::new_cart(1, "s1".to_string(), None);
        s.order_id = order_id.to_string();
        s.status = status;
        s
    }

    #[test]
    fn test_last_write_wins() {
        let mut cache = HashMap::new();
        apply_event(
            &mut cache,
            &FeedEvent::OrderCreated {
                snapshot: snapshot("o1", OrderStatus::Accepted),
            },
        );
        apply_event(
            &mut cache,
            &FeedEvent::OrderUpdated {
                snapshot: snapshot("o1", OrderStatus::Ready),
            },
        );
        assert_eq!(cache.len(), 1);
        assert_eq!(cache["o1"].status, OrderStatus::Ready);
    }

    #[test]
    fn test_terminal_orders_leave_active_view() {
        let mut cache = HashMap::new();
        apply_event(
            &mut cache,
            &FeedEvent::OrderCreated {
                snapshot: snapshot("o1", OrderStatus::Accepted),
            },
        );
        apply_event(
            &mut cache,
            &FeedEvent::OrderUpdated {
                snapshot: snapshot("o1", OrderStatus::Completed),
            },
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_out_of_order_replay_converges() {
        // A missed Created followed by a later Updated still converges
        let mut cache = HashMap::new();
        apply_event(
            &mut cache,
            &FeedEvent::OrderUpdated {
                snapshot: snapshot("o2", OrderStatus::Accepted),
            },
        );
        assert_eq!(cache["o2"].status, OrderStatus::Accepted);
    }

    #[test]
    fn test_event_serde_tag() {
        let event = FeedEvent::OrderCreated {
            snapshot: snapshot("o1", OrderStatus::Cart),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"order_created\""));
    }
}
