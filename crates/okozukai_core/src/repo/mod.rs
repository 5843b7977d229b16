//! Persistence adapters for expense records.
//!
//! # Responsibility
//! - Define the `ExpenseStore` contract the sync controller depends on.
//! - Provide process-local and SQLite-backed implementations.
//!
//! # Invariants
//! - Result sets are ordered by `created_at DESC`, ties by insertion order
//!   (latest insert first).
//! - Every committed write is followed by a full snapshot to all subscribers.
//! - Deleting an absent id is a successful no-op and notifies nobody.

pub mod expense_store;
pub mod memory_store;
pub mod sqlite_store;

pub use expense_store::{ExpenseStore, StoreError, StoreResult};
pub use memory_store::MemoryExpenseStore;
pub use sqlite_store::SqliteExpenseStore;

use crate::config::{StorageBackend, StorageConfig};
use log::info;

/// Builds the adapter selected by `storage.backend`.
pub fn open_store(config: &StorageConfig) -> StoreResult<Box<dyn ExpenseStore>> {
    let store: Box<dyn ExpenseStore> = match config.backend {
        StorageBackend::Memory => Box::new(MemoryExpenseStore::new()),
        StorageBackend::Sqlite => Box::new(SqliteExpenseStore::open(&config.path)?),
    };
    info!(
        "event=store_open module=repo status=ok backend={}",
        store.backend()
    );
    Ok(store)
}
