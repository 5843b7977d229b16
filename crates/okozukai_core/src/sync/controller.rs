//! Sync controller between the visible ledger and a persistence adapter.
//!
//! # Responsibility
//! - Own one live subscription per view and apply its snapshots wholesale.
//! - Own the entry form draft and turn submit/delete into adapter calls.
//!
//! # Invariants
//! - The ledger changes only inside `sync_pending`, via `replace_all`.
//! - Submit never inserts locally; the record appears with the next snapshot.
//! - Delete targets the id captured in the displayed row; it never
//!   re-queries to resolve a position.
//! - Persistence failures leave ledger state untouched and are not retried.

use crate::ledger::LedgerStore;
use crate::model::amount::Amount;
use crate::model::expense::{ExpenseId, ExpenseValidationError, NewExpense};
use crate::repo::expense_store::{ExpenseStore, StoreError};
use crate::sync::clock::{Clock, SystemClock};
use crate::sync::feed::{SnapshotReceiver, Subscription};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::TryRecvError;

/// Subscription lifecycle of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unsubscribed,
    Subscribed,
}

/// Controller-level failure surfaced to the view.
#[derive(Debug)]
pub enum SyncError {
    /// Input rejected before any request was issued.
    Validation(ExpenseValidationError),
    /// Adapter call failed; the ledger keeps the last applied snapshot.
    PersistenceUnavailable(StoreError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid entry: {err}"),
            Self::PersistenceUnavailable(err) => {
                write!(f, "could not reach expense storage: {err}")
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::PersistenceUnavailable(err) => Some(err),
        }
    }
}

impl From<ExpenseValidationError> for SyncError {
    fn from(value: ExpenseValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            other => Self::PersistenceUnavailable(other),
        }
    }
}

/// Raw form input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub amount: String,
    pub memo: String,
}

impl EntryDraft {
    pub fn new(amount: impl Into<String>, memo: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            memo: memo.into(),
        }
    }

    pub fn clear(&mut self) {
        self.amount.clear();
        self.memo.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_empty() && self.memo.is_empty()
    }
}

struct LiveFeed {
    receiver: SnapshotReceiver,
    subscription: Subscription,
}

/// Mediates every read and write between one view and an `ExpenseStore`.
pub struct SyncController<S: ExpenseStore> {
    store: S,
    clock: Box<dyn Clock>,
    currency_scale: u8,
    ledger: LedgerStore,
    draft: EntryDraft,
    live: Option<LiveFeed>,
}

impl<S: ExpenseStore> SyncController<S> {
    /// Creates an unsubscribed controller using the wall clock and scale 0.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Box::new(SystemClock),
            currency_scale: 0,
            ledger: LedgerStore::new(),
            draft: EntryDraft::default(),
            live: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Sets how many fractional digits amount input may carry.
    pub fn with_currency_scale(mut self, scale: u8) -> Self {
        self.currency_scale = scale;
        self
    }

    pub fn state(&self) -> SyncState {
        if self.live.is_some() {
            SyncState::Subscribed
        } else {
            SyncState::Unsubscribed
        }
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn currency_scale(&self) -> u8 {
        self.currency_scale
    }

    pub fn draft(&self) -> &EntryDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut EntryDraft {
        &mut self.draft
    }

    /// Opens the live subscription; no-op while already subscribed.
    ///
    /// The initial snapshot is queued, not applied: call `sync_pending`.
    pub fn activate(&mut self) -> Result<(), SyncError> {
        if self.live.is_some() {
            return Ok(());
        }
        let (receiver, subscription) = self.store.subscribe().map_err(|err| {
            warn!(
                "event=sync_activate module=sync status=error backend={} error={err}",
                self.store.backend()
            );
            SyncError::from(err)
        })?;
        info!(
            "event=sync_activate module=sync status=ok backend={} subscription_id={}",
            self.store.backend(),
            subscription.id()
        );
        self.live = Some(LiveFeed {
            receiver,
            subscription,
        });
        Ok(())
    }

    /// Releases the subscription; returns whether a teardown happened.
    ///
    /// Calling this again, or before `activate`, is a no-op.
    pub fn deactivate(&mut self) -> bool {
        let Some(mut live) = self.live.take() else {
            return false;
        };
        let released = live.subscription.unsubscribe();
        info!(
            "event=sync_deactivate module=sync status=ok subscription_id={} released={released}",
            live.subscription.id()
        );
        released
    }

    /// Applies every queued snapshot, oldest first.
    ///
    /// Returns the number of snapshots applied; `0` while unsubscribed.
    pub fn sync_pending(&mut self) -> usize {
        let Some(live) = self.live.as_ref() else {
            return 0;
        };

        let mut applied = 0;
        loop {
            match live.receiver.try_recv() {
                Ok(snapshot) => {
                    debug!(
                        "event=sync_apply module=sync status=ok version={} records={}",
                        snapshot.version,
                        snapshot.records.len()
                    );
                    self.ledger.replace_all(snapshot.records);
                    applied += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("event=sync_apply module=sync status=error error_code=feed_disconnected");
                    break;
                }
            }
        }
        applied
    }

    /// Validates the draft and issues one create request.
    ///
    /// On success the draft is cleared and the new id returned; the ledger
    /// only shows the record after the next `sync_pending`. On any error the
    /// draft is kept as typed.
    pub fn submit(&mut self) -> Result<ExpenseId, SyncError> {
        let amount = Amount::parse(&self.draft.amount, self.currency_scale)?;
        let request = NewExpense::new(amount, self.draft.memo.clone(), self.clock.now_ms())?;

        match self.store.create(&request) {
            Ok(id) => {
                debug!("event=sync_submit module=sync status=ok expense_id={id}");
                self.draft.clear();
                Ok(id)
            }
            Err(err) => {
                warn!(
                    "event=sync_submit module=sync status=error backend={} error={err}",
                    self.store.backend()
                );
                Err(err.into())
            }
        }
    }

    /// Replaces the draft with the given input and submits it.
    pub fn submit_entry(&mut self, amount: &str, memo: &str) -> Result<ExpenseId, SyncError> {
        self.draft = EntryDraft::new(amount, memo);
        self.submit()
    }

    /// Deletes the record displayed at `index`.
    ///
    /// Returns the targeted id, or `None` when nothing is displayed there.
    pub fn delete_at(&mut self, index: usize) -> Result<Option<ExpenseId>, SyncError> {
        let Some(id) = self.ledger.get(index).map(|expense| expense.id) else {
            debug!(
                "event=sync_delete module=sync status=skipped index={index} displayed={}",
                self.ledger.len()
            );
            return Ok(None);
        };
        self.delete(id)?;
        Ok(Some(id))
    }

    /// Deletes by identifier; `Ok(false)` when the record was already gone.
    pub fn delete(&mut self, id: ExpenseId) -> Result<bool, SyncError> {
        self.store.delete_by_id(id).map_err(|err| {
            warn!(
                "event=sync_delete module=sync status=error backend={} expense_id={id} error={err}",
                self.store.backend()
            );
            SyncError::from(err)
        })
    }
}
