use crate::model::expense::{Expense, ExpenseId};

/// Read-through cache of the persisted expense list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerStore {
    records: Vec<Expense>,
    total: i64,
    revision: u64,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps the whole visible ledger and recomputes the total.
    ///
    /// Records are taken as-is; the caller's order is authoritative.
    pub fn replace_all(&mut self, records: Vec<Expense>) {
        // Amounts are capped at `Amount::MAX`, so saturation needs ~9M max-size rows.
        self.total = records.iter().fold(0_i64, |sum, record| {
            sum.saturating_add(record.amount.minor_units())
        });
        self.records = records;
        self.revision += 1;
    }

    /// Sum of all current amounts in minor units; `0` when empty.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Records newest first, as delivered by the last snapshot.
    pub fn list(&self) -> &[Expense] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Expense> {
        self.records.get(index)
    }

    /// Position of a record in the displayed order.
    pub fn position(&self, id: ExpenseId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of snapshots applied so far.
    ///
    /// Views can compare revisions to skip redundant re-renders.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
