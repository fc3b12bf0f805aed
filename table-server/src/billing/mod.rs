//! Billing and close-out aggregation
//!
//! Sums `unit_price × quantity` over billable lines of a session's orders.
//! Orders still in cart, already completed or cancelled never bill;
//! rejected lines are excluded inside [`OrderSnapshot::subtotal`].

use crate::storage::Storage;
use shared::AppResult;
use shared::order::{OrderSnapshot, OrderStatus, round_cents};

/// Which orders of a session a due amount covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillScope<'a> {
    /// Everything on the session (staff close-out view)
    Session,
    /// Only the shared table bill (separate-bill orders excluded)
    SharedBill,
    /// Only one separate-bill party's orders
    Party(&'a str),
}

impl BillScope<'_> {
    fn includes(&self, order: &OrderSnapshot) -> bool {
        match self {
            Self::Session => true,
            Self::SharedBill => order.bill_tag.is_none(),
            Self::Party(tag) => order.bill_tag.as_deref() == Some(*tag),
        }
    }
}

/// Whether an order currently counts toward a due amount
pub fn is_billable(order: &OrderSnapshot) -> bool {
    matches!(order.status, OrderStatus::Accepted | OrderStatus::Ready)
}

/// Compute the due amount for a session under the given scope
pub fn compute_due(storage: &Storage, session_id: &str, scope: BillScope<'_>) -> AppResult<f64> {
    let orders = storage.orders_for_session(session_id)?;
    Ok(round_cents(
        orders
            .iter()
            .filter(|o| is_billable(o) && scope.includes(o))
            .map(|o| o.subtotal())
            .sum(),
    ))
}
