//! Ticket payloads for the printer collaborator
//!
//! The engine only produces the rendered data; print transport belongs to
//! the printer collaborator behind [`TicketSink`]. A ticket is handed off
//! on order acceptance (kitchen copy) and on session close (bill copy).

use shared::order::{LineStatus, OrderSnapshot, round_cents};
use shared::session::TableSession;
use shared::types::now_millis;

/// What a ticket documents
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketKind {
    /// Kitchen copy, printed when an order is admitted
    Kitchen,
    /// Bill copy, printed when a session closes
    Bill,
}

/// One printable line
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TicketLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Rendered ticket payload
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TicketPayload {
    pub kind: TicketKind,
    pub restaurant_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i64>,
    /// Order id for kitchen copies, session id for bill copies
    pub reference: String,
    pub lines: Vec<TicketLine>,
    pub total: f64,
    pub issued_at: i64,
}

impl TicketPayload {
    /// Kitchen copy for a freshly admitted order
    pub fn kitchen_copy(order: &OrderSnapshot, table_number: Option<i64>) -> Self {
        let lines = render_lines(std::slice::from_ref(order));
        let total = round_cents(lines.iter().map(|l| l.line_total).sum());
        Self {
            kind: TicketKind::Kitchen,
            restaurant_id: order.restaurant_id,
            table_number,
            reference: order.order_id.clone(),
            lines,
            total,
            issued_at: now_millis(),
        }
    }

    /// Bill copy aggregating all billable orders of a closing session
    pub fn bill_copy(session: &TableSession, orders: &[OrderSnapshot], due: f64) -> Self {
        Self {
            kind: TicketKind::Bill,
            restaurant_id: session.restaurant_id,
            table_number: session.table_number,
            reference: session.session_id.clone(),
            lines: render_lines(orders),
            total: due,
            issued_at: now_millis(),
        }
    }
}

fn render_lines(orders: &[OrderSnapshot]) -> Vec<TicketLine> {
    orders
        .iter()
        .flat_map(|o| o.lines.iter())
        .filter(|l| l.status != LineStatus::Rejected && l.quantity > 0)
        .map(|l| TicketLine {
            name: match &l.variant_id {
                Some(v) => format!("{} ({})", l.name, v),
                None => l.name.clone(),
            },
            quantity: l.quantity,
            unit_price: l.unit_price,
            line_total: round_cents(l.unit_price * l.quantity as f64),
        })
        .collect()
}

/// Printer collaborator boundary
pub trait TicketSink: Send + Sync {
    /// Hand a rendered ticket to the print transport
    fn deliver(&self, ticket: TicketPayload);
}

/// Default sink: logs the ticket instead of printing
#[derive(Debug, Default)]
pub struct LogTicketSink;

impl TicketSink for LogTicketSink {
    fn deliver(&self, ticket: TicketPayload) {
        tracing::info!(
            kind = ?ticket.kind,
            reference = %ticket.reference,
            lines = ticket.lines.len(),
            total = ticket.total,
            "Ticket rendered"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::LineKey;

    #[test]
    fn test_kitchen_copy_skips_rejected_lines() {
        let mut order = OrderSnapshot::new_cart(1, "s1".to_string(), None);
        let noodles = LineKey::new("noodles", None);
        let rice = LineKey::new("rice", None);
        order.increment_line(&noodles, "Noodles", "wok", 80.0);
        order.increment_line(&noodles, "Noodles", "wok", 80.0);
        order.increment_line(&rice, "Rice", "wok", 30.0);
        order.cancel_line_quantity(&rice, 1);

        let ticket = TicketPayload::kitchen_copy(&order, Some(7));
        assert_eq!(ticket.kind, TicketKind::Kitchen);
        assert_eq!(ticket.lines.len(), 1);
        assert_eq!(ticket.lines[0].name, "Noodles");
        assert_eq!(ticket.lines[0].line_total, 160.0);
        assert_eq!(ticket.total, 160.0);
    }

    #[test]
    fn test_bill_copy_spans_orders() {
        let session = TableSession::open(1, Some(7), "t-1".to_string());
        let mut o1 = OrderSnapshot::new_cart(1, session.session_id.clone(), None);
        o1.increment_line(&LineKey::new("noodles", None), "Noodles", "wok", 80.0);
        let mut o2 = OrderSnapshot::new_cart(1, session.session_id.clone(), None);
        o2.increment_line(&LineKey::new("tea", None), "Tea", "drinks", 5.0);

        let ticket = TicketPayload::bill_copy(&session, &[o1, o2], 85.0);
        assert_eq!(ticket.kind, TicketKind::Bill);
        assert_eq!(ticket.lines.len(), 2);
        assert_eq!(ticket.total, 85.0);
        assert_eq!(ticket.table_number, Some(7));
    }

    #[test]
    fn test_variant_rendered_in_name() {
        let mut order = OrderSnapshot::new_cart(1, "s1".to_string(), None);
        order.increment_line(
            &LineKey::new("noodles", Some("large".to_string())),
            "Noodles",
            "wok",
            95.0,
        );
        let ticket = TicketPayload::kitchen_copy(&order, None);
        assert_eq!(ticket.lines[0].name, "Noodles (large)");
    }
}
