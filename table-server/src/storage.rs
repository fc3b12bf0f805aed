//! redb-based storage layer for sessions, orders and settings
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `dining_tables` | `table_id` | `DiningTable` | Table registry |
//! | `table_numbers` | `(restaurant_id, number)` | `table_id` | Numeric address index |
//! | `sessions` | `session_id` | `TableSession` | Session records |
//! | `active_sessions` | `table_id` | `session_id` | One active session per table |
//! | `orders` | `order_id` | `OrderSnapshot` | Order state |
//! | `session_orders` | `(session_id, order_id)` | `()` | Session membership index |
//! | `active_orders` | `(restaurant_id, order_id)` | `()` | Kitchen-active index |
//! | `capacity_settings` | `restaurant_id` | `CapacitySettings` | Admission config |
//! | `processed_requests` | `request_id` | `()` | Mutation replay dedup |
//!
//! # Concurrency
//!
//! redb allows a single write transaction at a time, so every mutation of
//! session/order state is serialized: concurrent first-adds cannot create
//! two cart orders for one session, and a table scan racing another scan
//! cannot produce two active sessions for the same table.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::models::{CapacitySettings, DiningTable};
use shared::order::{OrderSnapshot, OrderStatus};
use shared::session::TableSession;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table registry: key = table_id, value = JSON-serialized DiningTable
const TABLES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("dining_tables");

/// Numeric address index: key = (restaurant_id, table number), value = table_id
const TABLE_NUMBERS_TABLE: TableDefinition<(i64, i64), &str> =
    TableDefinition::new("table_numbers");

/// Sessions: key = session_id, value = JSON-serialized TableSession
const SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Active session per table: key = table_id, value = session_id
const ACTIVE_SESSIONS_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("active_sessions");

/// Orders: key = order_id, value = JSON-serialized OrderSnapshot
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Session membership index: key = (session_id, order_id)
const SESSION_ORDERS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("session_orders");

/// Kitchen-active order index: key = (restaurant_id, order_id)
const ACTIVE_ORDERS_TABLE: TableDefinition<(i64, &str), ()> =
    TableDefinition::new("active_orders");

/// Capacity settings: key = restaurant_id, value = JSON-serialized CapacitySettings
const CAPACITY_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("capacity_settings");

/// Processed mutation request ids (replay dedup)
const PROCESSED_REQUESTS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_requests");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::AppError {
    fn from(err: StorageError) -> Self {
        shared::AppError::storage(err.to_string())
    }
}

/// Engine storage backed by redb
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl Storage {
    /// Open or create the database at the given path
    ///
    /// Commits are persistent as soon as `commit()` returns (copy-on-write
    /// with atomic pointer swap), so the database file is always in a
    /// consistent state even across power loss.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, ephemeral dev runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables up front so read transactions never race
        // against lazy creation
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(TABLE_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(SESSIONS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_SESSIONS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(SESSION_ORDERS_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(CAPACITY_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction (serialized: one writer at a time)
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Dining Tables ==========

    /// Insert or update a dining table and its numeric index
    pub fn store_table(&self, table: &DiningTable) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut tables = txn.open_table(TABLES_TABLE)?;
            tables.insert(table.id.as_str(), serde_json::to_vec(table)?.as_slice())?;
            let mut index = txn.open_table(TABLE_NUMBERS_TABLE)?;
            index.insert((table.restaurant_id, table.number), table.id.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a dining table by opaque id
    pub fn get_table(&self, table_id: &str) -> StorageResult<Option<DiningTable>> {
        let txn = self.db.begin_read()?;
        let tables = txn.open_table(TABLES_TABLE)?;
        match tables.get(table_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get a dining table by its numeric address
    pub fn get_table_by_number(
        &self,
        restaurant_id: i64,
        number: i64,
    ) -> StorageResult<Option<DiningTable>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_table(TABLE_NUMBERS_TABLE)?;
        let table_id = match index.get((restaurant_id, number))? {
            Some(guard) => guard.value().to_string(),
            None => return Ok(None),
        };
        drop(index);
        let tables = txn.open_table(TABLES_TABLE)?;
        match tables.get(table_id.as_str())? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// List all dining tables for a restaurant
    pub fn list_tables(&self, restaurant_id: i64) -> StorageResult<Vec<DiningTable>> {
        let txn = self.db.begin_read()?;
        let tables = txn.open_table(TABLES_TABLE)?;
        let mut result = Vec::new();
        for entry in tables.iter()? {
            let (_, value) = entry?;
            let table: DiningTable = serde_json::from_slice(value.value())?;
            if table.restaurant_id == restaurant_id {
                result.push(table);
            }
        }
        result.sort_by_key(|t| t.number);
        Ok(result)
    }

    // ========== Sessions ==========

    /// Get a session by id
    pub fn get_session(&self, session_id: &str) -> StorageResult<Option<TableSession>> {
        let txn = self.db.begin_read()?;
        let sessions = txn.open_table(SESSIONS_TABLE)?;
        match sessions.get(session_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get a session within a write transaction
    pub fn get_session_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> StorageResult<Option<TableSession>> {
        let sessions = txn.open_table(SESSIONS_TABLE)?;
        match sessions.get(session_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Persist a session within a write transaction
    pub fn store_session_txn(
        &self,
        txn: &WriteTransaction,
        session: &TableSession,
    ) -> StorageResult<()> {
        let mut sessions = txn.open_table(SESSIONS_TABLE)?;
        sessions.insert(
            session.session_id.as_str(),
            serde_json::to_vec(session)?.as_slice(),
        )?;
        Ok(())
    }

    /// The active session for a table, if any (within a write transaction)
    pub fn active_session_id_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<Option<String>> {
        let active = txn.open_table(ACTIVE_SESSIONS_TABLE)?;
        Ok(active.get(table_id)?.map(|guard| guard.value().to_string()))
    }

    /// Record the active session for a table
    pub fn set_active_session_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
        session_id: &str,
    ) -> StorageResult<()> {
        let mut active = txn.open_table(ACTIVE_SESSIONS_TABLE)?;
        active.insert(table_id, session_id)?;
        Ok(())
    }

    /// Clear the active session marker for a table
    pub fn clear_active_session_txn(
        &self,
        txn: &WriteTransaction,
        table_id: &str,
    ) -> StorageResult<()> {
        let mut active = txn.open_table(ACTIVE_SESSIONS_TABLE)?;
        active.remove(table_id)?;
        Ok(())
    }

    // ========== Orders ==========

    /// Get an order snapshot by id
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<OrderSnapshot>> {
        let txn = self.db.begin_read()?;
        let orders = txn.open_table(ORDERS_TABLE)?;
        match orders.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order snapshot within a write transaction
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let orders = txn.open_table(ORDERS_TABLE)?;
        match orders.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Persist an order snapshot within a write transaction
    pub fn store_order_txn(
        &self,
        txn: &WriteTransaction,
        order: &OrderSnapshot,
    ) -> StorageResult<()> {
        let mut orders = txn.open_table(ORDERS_TABLE)?;
        orders.insert(
            order.order_id.as_str(),
            serde_json::to_vec(order)?.as_slice(),
        )?;
        Ok(())
    }

    /// Link an order to its session
    pub fn link_session_order_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut index = txn.open_table(SESSION_ORDERS_TABLE)?;
        index.insert((session_id, order_id), ())?;
        Ok(())
    }

    /// All orders belonging to a session
    pub fn orders_for_session(&self, session_id: &str) -> StorageResult<Vec<OrderSnapshot>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_table(SESSION_ORDERS_TABLE)?;
        let mut order_ids = Vec::new();
        for entry in index.range((session_id, "")..)? {
            let (key, _) = entry?;
            let (sid, oid) = key.value();
            if sid != session_id {
                break;
            }
            order_ids.push(oid.to_string());
        }
        drop(index);

        let orders = txn.open_table(ORDERS_TABLE)?;
        let mut result = Vec::new();
        for id in order_ids {
            if let Some(guard) = orders.get(id.as_str())? {
                result.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(result)
    }

    /// All orders belonging to a session, within a write transaction
    pub fn orders_for_session_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> StorageResult<Vec<OrderSnapshot>> {
        let index = txn.open_table(SESSION_ORDERS_TABLE)?;
        let mut order_ids = Vec::new();
        for entry in index.range((session_id, "")..)? {
            let (key, _) = entry?;
            let (sid, oid) = key.value();
            if sid != session_id {
                break;
            }
            order_ids.push(oid.to_string());
        }
        drop(index);

        let orders = txn.open_table(ORDERS_TABLE)?;
        let mut result = Vec::new();
        for id in order_ids {
            if let Some(guard) = orders.get(id.as_str())? {
                result.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(result)
    }

    /// Find the open cart order for `(session, bill_tag)`, if one exists
    pub fn find_open_cart_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        bill_tag: Option<&str>,
    ) -> StorageResult<Option<OrderSnapshot>> {
        let orders = self.orders_for_session_txn(txn, session_id)?;
        Ok(orders
            .into_iter()
            .find(|o| o.status == OrderStatus::Cart && o.bill_tag.as_deref() == bill_tag))
    }

    /// Mark an order as kitchen-active
    pub fn mark_order_active_txn(
        &self,
        txn: &WriteTransaction,
        restaurant_id: i64,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        active.insert((restaurant_id, order_id), ())?;
        Ok(())
    }

    /// Remove an order from the kitchen-active index
    pub fn mark_order_inactive_txn(
        &self,
        txn: &WriteTransaction,
        restaurant_id: i64,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        active.remove((restaurant_id, order_id))?;
        Ok(())
    }

    /// All kitchen-active order snapshots for a restaurant
    pub fn active_orders(&self, restaurant_id: i64) -> StorageResult<Vec<OrderSnapshot>> {
        let txn = self.db.begin_read()?;
        let active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let mut order_ids = Vec::new();
        for entry in active.range((restaurant_id, "")..)? {
            let (key, _) = entry?;
            let (rid, oid) = key.value();
            if rid != restaurant_id {
                break;
            }
            order_ids.push(oid.to_string());
        }
        drop(active);

        let orders = txn.open_table(ORDERS_TABLE)?;
        let mut result: Vec<OrderSnapshot> = Vec::new();
        for id in order_ids {
            if let Some(guard) = orders.get(id.as_str())? {
                result.push(serde_json::from_slice(guard.value())?);
            }
        }
        result.sort_by_key(|o| o.created_at);
        Ok(result)
    }

    /// Kitchen-active snapshots within a write transaction (admission check)
    pub fn active_snapshots_txn(
        &self,
        txn: &WriteTransaction,
        restaurant_id: i64,
    ) -> StorageResult<Vec<OrderSnapshot>> {
        let active = txn.open_table(ACTIVE_ORDERS_TABLE)?;
        let mut order_ids = Vec::new();
        for entry in active.range((restaurant_id, "")..)? {
            let (key, _) = entry?;
            let (rid, oid) = key.value();
            if rid != restaurant_id {
                break;
            }
            order_ids.push(oid.to_string());
        }
        drop(active);

        let orders = txn.open_table(ORDERS_TABLE)?;
        let mut result = Vec::new();
        for id in order_ids {
            if let Some(guard) = orders.get(id.as_str())? {
                result.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(result)
    }

    // ========== Capacity Settings ==========

    /// Get capacity settings for a restaurant
    pub fn get_capacity(&self, restaurant_id: i64) -> StorageResult<Option<CapacitySettings>> {
        let txn = self.db.begin_read()?;
        let capacity = txn.open_table(CAPACITY_TABLE)?;
        match capacity.get(restaurant_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Persist capacity settings for a restaurant
    pub fn store_capacity(
        &self,
        restaurant_id: i64,
        settings: &CapacitySettings,
    ) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut capacity = txn.open_table(CAPACITY_TABLE)?;
            capacity.insert(restaurant_id, serde_json::to_vec(settings)?.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Request Dedup ==========

    /// Whether a mutation request id was already processed
    pub fn is_request_processed_txn(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
    ) -> StorageResult<bool> {
        let processed = txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        Ok(processed.get(request_id)?.is_some())
    }

    /// Record a processed mutation request id
    pub fn mark_request_processed_txn(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
    ) -> StorageResult<()> {
        let mut processed = txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        processed.insert(request_id, ())?;
        Ok(())
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}
