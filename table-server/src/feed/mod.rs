//! Order feed - broadcast channel feeding kitchen and cashier displays
//!
//! # 消息流
//!
//! ```text
//! Ledger ──▶ publish() ──▶ broadcast::Sender ──▶ 所有订阅的显示端
//! ```
//!
//! Events are published only after the storage transaction commits, so a
//! subscriber never sees state that later rolled back. Delivery is
//! at-most-once per connection; a display that lags past the channel
//! capacity drops events and reconciles through the active-orders poll.
//!
//! Every event carries a per-restaurant sequence number (surfaced as the
//! SSE event id) so a display can tell that it missed something and
//! trigger the backstop poll early instead of waiting for the next one.

use dashmap::DashMap;
use shared::FeedEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity (峰值: 整个饭点的订单事件)
const FEED_CHANNEL_CAPACITY: usize = 4096;

/// A feed event with its per-restaurant sequence number
#[derive(Debug, Clone)]
pub struct SequencedEvent {
    pub sequence: u64,
    pub event: FeedEvent,
}

/// Order event feed
#[derive(Debug, Clone)]
pub struct OrderFeed {
    tx: broadcast::Sender<SequencedEvent>,
    /// 每个餐厅独立递增的事件序号
    sequences: Arc<DashMap<i64, u64>>,
}

impl OrderFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CHANNEL_CAPACITY);
        Self {
            tx,
            sequences: Arc::new(DashMap::new()),
        }
    }

    /// Publish an event to all subscribed displays
    ///
    /// A send error only means no display is currently connected; the
    /// poll backstop covers them when they return.
    pub fn publish(&self, event: FeedEvent) {
        let sequence = self.next_sequence(event.snapshot().restaurant_id);
        if self.tx.send(SequencedEvent { sequence, event }).is_err() {
            tracing::debug!("Feed event dropped: no active subscribers");
        }
    }

    /// Subscribe to the feed
    pub fn subscribe(&self) -> broadcast::Receiver<SequencedEvent> {
        self.tx.subscribe()
    }

    /// Number of currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Current sequence for a restaurant (0 if nothing published yet)
    pub fn current_sequence(&self, restaurant_id: i64) -> u64 {
        self.sequences
            .get(&restaurant_id)
            .map(|v| *v)
            .unwrap_or(0)
    }

    fn next_sequence(&self, restaurant_id: i64) -> u64 {
        let mut entry = self.sequences.entry(restaurant_id).or_insert(0);
        *entry += 1;
        *entry
    }
}

impl Default for OrderFeed {
    fn default() -> Self {
        Self::new()
    }
}
