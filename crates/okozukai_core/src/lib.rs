//! Core ledger logic for okozukai, a personal expense book.
//! This crate is the single source of truth for ledger invariants; front ends
//! only render `LedgerStore` and forward user input to `SyncController`.

pub mod config;
pub mod db;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sync;

pub use config::{AppConfig, ConfigError, CurrencyConfig, StorageBackend, StorageConfig};
pub use ledger::LedgerStore;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::amount::{format_minor_units, Amount};
pub use model::expense::{Expense, ExpenseId, ExpenseValidationError, NewExpense};
pub use repo::{
    open_store, ExpenseStore, MemoryExpenseStore, SqliteExpenseStore, StoreError, StoreResult,
};
pub use sync::{
    Clock, EntryDraft, ExpenseSnapshot, ManualClock, SnapshotReceiver, Subscription,
    SyncController, SyncError, SyncState, SystemClock,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
