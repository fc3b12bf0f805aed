//! Order domain types
//!
//! - **types**: statuses, line items, age buckets
//! - **snapshot**: the full order state shipped to every consumer
//!
//! Mutation of these types is owned by the server's ledger; clients treat
//! snapshots as read-only and converge on them last-write-wins.

mod snapshot;
mod types;

pub use snapshot::{OrderSnapshot, round_cents};
pub use types::{AgeBucket, LineKey, LineStatus, OrderKind, OrderLine, OrderStatus};
