//! SQLite-backed expense store.
//!
//! # Responsibility
//! - Persist expenses durably in the `expenses` table.
//! - Push full snapshots to subscribers after each committed write.
//!
//! # Invariants
//! - The wrapped connection must be fully migrated before use.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Memo text is never written to logs.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::{open_db, open_db_in_memory};
use crate::model::amount::Amount;
use crate::model::expense::{Expense, ExpenseId, NewExpense};
use crate::repo::expense_store::{ExpenseStore, StoreError, StoreResult};
use crate::sync::feed::{SnapshotReceiver, SubscriberRegistry, Subscription};
use log::{error, info, warn};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const EXPENSE_SELECT_SQL: &str = "SELECT
    uuid,
    amount,
    memo,
    created_at
FROM expenses
ORDER BY created_at DESC, seq DESC";

/// Durable `ExpenseStore` over one SQLite connection.
#[derive(Debug)]
pub struct SqliteExpenseStore {
    conn: Connection,
    feed: Arc<SubscriberRegistry>,
}

impl SqliteExpenseStore {
    /// Wraps a connection previously returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when the schema was tampered with.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn,
            feed: SubscriberRegistry::new(),
        })
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn load_all(&self) -> StoreResult<Vec<Expense>> {
        let mut stmt = self.conn.prepare_cached(EXPENSE_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut expenses = Vec::new();
        while let Some(row) = rows.next()? {
            expenses.push(parse_expense_row(row)?);
        }
        Ok(expenses)
    }

    /// Broadcasts the committed state; a failed re-read is logged only, since
    /// the write itself already succeeded.
    fn notify_subscribers(&self, event: &str) {
        if !self.feed.has_subscribers() {
            return;
        }
        match self.load_all() {
            Ok(records) => {
                self.feed.broadcast(&records);
            }
            Err(err) => {
                warn!(
                    "event={event} module=repo backend=sqlite status=degraded error_code=snapshot_reload_failed error={err}"
                );
            }
        }
    }
}

impl ExpenseStore for SqliteExpenseStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn create(&self, request: &NewExpense) -> StoreResult<ExpenseId> {
        let started_at = Instant::now();
        let expense = Expense::from_request(Uuid::new_v4(), request)?;

        let inserted = self.conn.execute(
            "INSERT INTO expenses (uuid, amount, memo, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                expense.id.to_string(),
                expense.amount.minor_units(),
                expense.memo.as_str(),
                expense.created_at,
            ],
        );
        if let Err(err) = inserted {
            error!(
                "event=expense_create module=repo backend=sqlite status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err.into());
        }

        info!(
            "event=expense_create module=repo backend=sqlite status=ok expense_id={} duration_ms={}",
            expense.id,
            started_at.elapsed().as_millis()
        );
        self.notify_subscribers("expense_create");
        Ok(expense.id)
    }

    fn query(&self) -> StoreResult<Vec<Expense>> {
        self.load_all()
    }

    fn delete_by_id(&self, id: ExpenseId) -> StoreResult<bool> {
        let started_at = Instant::now();
        let changed = match self
            .conn
            .execute("DELETE FROM expenses WHERE uuid = ?1;", [id.to_string()])
        {
            Ok(changed) => changed,
            Err(err) => {
                error!(
                    "event=expense_delete module=repo backend=sqlite status=error expense_id={id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };
        let removed = changed > 0;

        info!(
            "event=expense_delete module=repo backend=sqlite status=ok expense_id={id} removed={removed} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        if removed {
            self.notify_subscribers("expense_delete");
        }
        Ok(removed)
    }

    fn subscribe(&self) -> StoreResult<(SnapshotReceiver, Subscription)> {
        let current = self.load_all()?;
        Ok(self.feed.register(current))
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let has_table: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'expenses'
        );",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Err(StoreError::MissingRequiredTable("expenses"));
    }
    Ok(())
}

fn parse_expense_row(row: &Row<'_>) -> StoreResult<Expense> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in expenses.uuid"))
    })?;

    let raw_amount: i64 = row.get("amount")?;
    let amount = Amount::new(raw_amount).map_err(|err| {
        StoreError::InvalidData(format!("invalid amount `{raw_amount}` in expenses.amount: {err}"))
    })?;

    let expense = Expense {
        id,
        amount,
        memo: row.get("memo")?,
        created_at: row.get("created_at")?,
    };
    expense
        .validate()
        .map_err(|err| StoreError::InvalidData(format!("expense {id}: {err}")))?;
    Ok(expense)
}
