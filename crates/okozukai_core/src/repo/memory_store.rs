//! Process-local expense store.
//!
//! # Responsibility
//! - Back the local-only variant: records live as long as the process.
//! - Simulate an unreachable backend on demand for failure-path testing.
//!
//! # Invariants
//! - Identifiers are assigned here, exactly like the durable backend.
//! - While unavailable, every call fails and no state changes.
//! - Broadcasts and registrations happen under the state lock (lock order
//!   state, then feed), so snapshots reach subscribers in commit order.

use crate::model::expense::{Expense, ExpenseId, NewExpense};
use crate::repo::expense_store::{ExpenseStore, StoreError, StoreResult};
use crate::sync::feed::{SnapshotReceiver, SubscriberRegistry, Subscription};
use log::info;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug)]
struct StoredExpense {
    seq: u64,
    expense: Expense,
}

#[derive(Debug)]
struct MemoryState {
    rows: Vec<StoredExpense>,
    next_seq: u64,
    available: bool,
}

/// In-memory `ExpenseStore`.
#[derive(Debug)]
pub struct MemoryExpenseStore {
    state: Mutex<MemoryState>,
    feed: Arc<SubscriberRegistry>,
}

impl Default for MemoryExpenseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryExpenseStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                rows: Vec::new(),
                next_seq: 1,
                available: true,
            }),
            feed: SubscriberRegistry::new(),
        }
    }

    /// Toggles simulated reachability.
    ///
    /// Existing subscriptions stay registered; they simply stop receiving
    /// snapshots because no write can succeed.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
        info!("event=store_availability module=repo backend=memory available={available}");
    }

    pub fn is_available(&self) -> bool {
        self.lock().available
    }

    /// Number of live subscribers on this store.
    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(state: &MemoryState) -> StoreResult<()> {
        if state.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "memory store is switched offline".to_string(),
            ))
        }
    }
}

fn ordered(rows: &[StoredExpense]) -> Vec<Expense> {
    let mut sorted: Vec<&StoredExpense> = rows.iter().collect();
    sorted.sort_by(|a, b| {
        b.expense
            .created_at
            .cmp(&a.expense.created_at)
            .then(b.seq.cmp(&a.seq))
    });
    sorted.into_iter().map(|row| row.expense.clone()).collect()
}

impl ExpenseStore for MemoryExpenseStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn create(&self, request: &NewExpense) -> StoreResult<ExpenseId> {
        request.validate()?;

        let mut state = self.lock();
        Self::ensure_available(&state)?;

        let expense = Expense::from_request(Uuid::new_v4(), request)?;
        let id = expense.id;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.rows.push(StoredExpense { seq, expense });
        self.feed.broadcast(&ordered(&state.rows));
        drop(state);

        info!("event=expense_create module=repo backend=memory status=ok expense_id={id}");
        Ok(id)
    }

    fn query(&self) -> StoreResult<Vec<Expense>> {
        let state = self.lock();
        Self::ensure_available(&state)?;
        Ok(ordered(&state.rows))
    }

    fn delete_by_id(&self, id: ExpenseId) -> StoreResult<bool> {
        let mut state = self.lock();
        Self::ensure_available(&state)?;

        let before = state.rows.len();
        state.rows.retain(|row| row.expense.id != id);
        let removed = state.rows.len() != before;
        if removed {
            self.feed.broadcast(&ordered(&state.rows));
        }
        drop(state);

        info!("event=expense_delete module=repo backend=memory status=ok expense_id={id} removed={removed}");
        Ok(removed)
    }

    fn subscribe(&self) -> StoreResult<(SnapshotReceiver, Subscription)> {
        let state = self.lock();
        Self::ensure_available(&state)?;
        Ok(self.feed.register(ordered(&state.rows)))
    }
}
