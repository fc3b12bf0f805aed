//! Table session types
//!
//! A session is one occupancy record of a table, spanning possibly many
//! orders. At most one session per table is active at a time.

use crate::types::{Timestamp, now_millis};
use serde::{Deserialize, Serialize};

/// Session status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    Open,
    Closed,
}

/// One occupancy of a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSession {
    /// Server-issued opaque id
    pub session_id: String,
    pub restaurant_id: i64,
    /// Numeric table address (None for opaque-id-only tables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i64>,
    /// Opaque table identifier from the scanned code
    pub table_id: String,
    pub status: SessionStatus,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<Timestamp>,
    /// Whether the bill was settled when the session closed
    #[serde(default)]
    pub paid: bool,
    /// Payment label supplied by staff at close ("cash", "card", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
}

impl TableSession {
    /// Create a fresh open session for a table
    pub fn open(restaurant_id: i64, table_number: Option<i64>, table_id: String) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            restaurant_id,
            table_number,
            table_id,
            status: SessionStatus::Open,
            created_at: now_millis(),
            closed_at: None,
            paid: false,
            payment_mode: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// Result of a table scan
///
/// `is_occupied=true` is a decision point, not a failure: the caller must
/// surface the join-shared-bill / start-separate-bill choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub session_id: String,
    pub restaurant_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i64>,
    pub is_occupied: bool,
}

/// Billing intent chosen by a diner joining an occupied table
///
/// "Separate" keeps the shared `session_id` for table tracking but scopes
/// due aggregation to the caller's own orders via `bill_tag`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "intent")]
pub enum BillingIntent {
    #[default]
    Shared,
    Separate {
        /// Caller-generated key distinguishing this party's orders
        bill_tag: String,
    },
}

impl BillingIntent {
    /// The bill tag carried on orders placed under this intent
    pub fn bill_tag(&self) -> Option<&str> {
        match self {
            Self::Shared => None,
            Self::Separate { bill_tag } => Some(bill_tag),
        }
    }
}

/// Client-held session/table context, passed explicitly on each request
///
/// Replaces ambient client-side storage: the resolver reads it to supply
/// restaurant context for numeric codes, and `adopt_session` discards any
/// cart state held for a different table before adopting a new session.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// The open cart order for this context, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_order_id: Option<String>,
    #[serde(default)]
    pub billing_intent: BillingIntent,
}

impl SessionContext {
    /// Adopt a newly started session, discarding stale cross-table state
    ///
    /// Any cart/order context held for a different `(restaurant, table)`
    /// pair is dropped before the new session is recorded.
    pub fn adopt_session(&mut self, outcome: &ScanOutcome) {
        let same_table = self.restaurant_id == Some(outcome.restaurant_id)
            && self.table_number == outcome.table_number;
        if !same_table {
            self.open_order_id = None;
            self.billing_intent = BillingIntent::Shared;
        }
        self.restaurant_id = Some(outcome.restaurant_id);
        self.table_number = outcome.table_number;
        self.session_id = Some(outcome.session_id.clone());
    }

    /// Drop the cached open-order reference (stale-reference recovery)
    pub fn clear_open_order(&mut self) {
        self.open_order_id = None;
    }
}
