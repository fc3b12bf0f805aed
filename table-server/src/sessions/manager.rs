//! SessionManager - table occupancy and session lifecycle

use crate::billing;
use crate::identity::ResolvedTarget;
use crate::storage::{Storage, StorageError};
use crate::ticket::{TicketPayload, TicketSink};
use shared::order::{OrderStatus, round_cents};
use shared::session::{ScanOutcome, TableSession};
use shared::types::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

/// Session lifecycle manager
///
/// All session mutations run inside serialized write transactions: the
/// occupancy check and session creation are atomic, so two racing scans of
/// an empty table produce exactly one session and the loser observes it as
/// occupied.
pub struct SessionManager {
    storage: Storage,
    tickets: Arc<dyn TicketSink>,
}

impl SessionManager {
    pub fn new(storage: Storage, tickets: Arc<dyn TicketSink>) -> Self {
        Self { storage, tickets }
    }

    /// Start or join a session for the scanned table
    ///
    /// Returns the existing active session with `is_occupied=true` (the
    /// caller must then surface the join/separate choice) or creates a
    /// fresh one. Never creates a second active session for a table.
    pub fn start_session(&self, target: &ResolvedTarget) -> AppResult<ScanOutcome> {
        let table = match target {
            ResolvedTarget::Numeric {
                restaurant_id,
                table_number,
            } => self.storage.get_table_by_number(*restaurant_id, *table_number)?,
            ResolvedTarget::Opaque { table_id } => self.storage.get_table(table_id)?,
        }
        .ok_or_else(|| AppError::new(ErrorCode::TableNotFound))?;

        if !table.is_active {
            return Err(AppError::with_message(
                ErrorCode::TableDisabled,
                format!("Table {} is not available, please ask the staff", table.number),
            ));
        }

        let txn = self.storage.begin_write()?;

        if let Some(session_id) = self.storage.active_session_id_txn(&txn, &table.id)? {
            match self.storage.get_session_txn(&txn, &session_id)? {
                Some(session) if session.is_open() => {
                    return Ok(ScanOutcome {
                        session_id,
                        restaurant_id: table.restaurant_id,
                        table_number: Some(table.number),
                        is_occupied: true,
                    });
                }
                _ => {
                    // Stale marker from a crash mid-close; fall through and
                    // open a fresh session
                    tracing::warn!(table_id = %table.id, session_id = %session_id, "Clearing stale active-session marker");
                    self.storage.clear_active_session_txn(&txn, &table.id)?;
                }
            }
        }

        let session = TableSession::open(table.restaurant_id, Some(table.number), table.id.clone());
        self.storage.store_session_txn(&txn, &session)?;
        self.storage
            .set_active_session_txn(&txn, &table.id, &session.session_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            session_id = %session.session_id,
            restaurant_id = table.restaurant_id,
            table_number = table.number,
            "Session started"
        );
        Ok(ScanOutcome {
            session_id: session.session_id,
            restaurant_id: table.restaurant_id,
            table_number: Some(table.number),
            is_occupied: false,
        })
    }

    /// Close a session (pay-and-close or administrative close)
    ///
    /// Idempotent: ending an already-closed session is a no-op success.
    /// Closing with outstanding due and `mark_paid=false` requires an
    /// explicit `force` acknowledgement from staff.
    pub fn end_session(
        &self,
        session_id: &str,
        mark_paid: bool,
        payment_mode: Option<String>,
        force: bool,
    ) -> AppResult<TableSession> {
        let txn = self.storage.begin_write()?;
        let mut session = self
            .storage
            .get_session_txn(&txn, session_id)?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))?;

        if !session.is_open() {
            return Ok(session);
        }

        let orders = self.storage.orders_for_session_txn(&txn, session_id)?;
        let due = round_cents(
            orders
                .iter()
                .filter(|o| billing::is_billable(o))
                .map(|o| o.subtotal())
                .sum(),
        );

        if due > 0.0 && !mark_paid && !force {
            return Err(AppError::with_message(
                ErrorCode::OutstandingBalance,
                format!("Session still owes {:.2}; confirm before closing unpaid", due),
            )
            .with_detail("due", due));
        }

        // Leftover carts die with the session
        for mut order in orders.iter().filter(|o| o.status == OrderStatus::Cart).cloned() {
            order.status = OrderStatus::Cancelled;
            order.updated_at = now_millis();
            self.storage.store_order_txn(&txn, &order)?;
        }

        session.status = shared::session::SessionStatus::Closed;
        session.closed_at = Some(now_millis());
        session.paid = mark_paid;
        session.payment_mode = payment_mode;
        self.storage.store_session_txn(&txn, &session)?;
        self.storage
            .clear_active_session_txn(&txn, &session.table_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            session_id = %session.session_id,
            paid = mark_paid,
            due,
            "Session closed"
        );

        let billable: Vec<_> = orders.into_iter().filter(billing::is_billable).collect();
        self.tickets
            .deliver(TicketPayload::bill_copy(&session, &billable, due));
        Ok(session)
    }

    /// Load a session by id
    pub fn get_session(&self, session_id: &str) -> AppResult<TableSession> {
        self.storage
            .get_session(session_id)?
            .ok_or_else(|| AppError::new(ErrorCode::SessionNotFound))
    }

    /// Due amount helper used by the close-out endpoints
    pub fn compute_due(
        &self,
        session_id: &str,
        scope: billing::BillScope<'_>,
    ) -> AppResult<f64> {
        billing::compute_due(&self.storage, session_id, scope)
    }
}
