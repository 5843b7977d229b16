//! Live snapshot feed shared by persistence adapters.
//!
//! # Responsibility
//! - Track subscribers and push full ordered snapshots to each of them.
//! - Hand out `Subscription` handles whose release is idempotent.
//!
//! # Invariants
//! - A new subscriber receives the current result set before anything else.
//! - Every snapshot carries the complete result set, never a diff.
//! - Releasing a subscription twice has no further effect.

use crate::model::expense::Expense;
use log::debug;
use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Receiving end of a live subscription.
pub type SnapshotReceiver = Receiver<ExpenseSnapshot>;

/// Complete, point-in-time result set pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseSnapshot {
    /// Records ordered by `created_at` descending.
    pub records: Vec<Expense>,
    /// Feed-wide counter, increases with every broadcast.
    pub version: u64,
}

#[derive(Debug, Default)]
struct FeedState {
    next_subscriber_id: u64,
    version: u64,
    subscribers: BTreeMap<u64, Sender<ExpenseSnapshot>>,
}

/// Registry of live subscribers for one persistence adapter.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    state: Mutex<FeedState>,
}

impl SubscriberRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds a subscriber and queues `initial` as its first snapshot.
    pub fn register(self: &Arc<Self>, initial: Vec<Expense>) -> (SnapshotReceiver, Subscription) {
        let (sender, receiver) = channel();
        let mut state = self.lock();
        let id = state.next_subscriber_id;
        state.next_subscriber_id += 1;

        // Receiver is alive here, so the initial send cannot fail.
        let _ = sender.send(ExpenseSnapshot {
            records: initial,
            version: state.version,
        });
        state.subscribers.insert(id, sender);
        debug!(
            "event=feed_subscribe module=sync status=ok subscriber_id={id} subscribers={}",
            state.subscribers.len()
        );

        let subscription = Subscription {
            id,
            registry: Arc::downgrade(self),
            released: false,
        };
        (receiver, subscription)
    }

    /// Pushes `records` to every live subscriber and prunes dead ones.
    ///
    /// Returns how many subscribers received the snapshot.
    pub fn broadcast(&self, records: &[Expense]) -> usize {
        let mut state = self.lock();
        state.version += 1;
        let snapshot = ExpenseSnapshot {
            records: records.to_vec(),
            version: state.version,
        };

        let before = state.subscribers.len();
        state
            .subscribers
            .retain(|_, sender| sender.send(snapshot.clone()).is_ok());
        let delivered = state.subscribers.len();
        debug!(
            "event=feed_broadcast module=sync status=ok version={} records={} delivered={delivered} pruned={}",
            snapshot.version,
            snapshot.records.len(),
            before - delivered
        );
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub fn has_subscribers(&self) -> bool {
        self.subscriber_count() > 0
    }

    fn release(&self, id: u64) -> bool {
        let mut state = self.lock();
        let removed = state.subscribers.remove(&id).is_some();
        if removed {
            debug!(
                "event=feed_unsubscribe module=sync status=ok subscriber_id={id} subscribers={}",
                state.subscribers.len()
            );
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle that keeps one subscriber registered.
///
/// Released by `unsubscribe` or on drop, whichever comes first.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriberRegistry>,
    released: bool,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        !self.released
    }

    /// Releases the subscriber.
    ///
    /// Returns `true` only for the call that performed the teardown; later
    /// calls are no-ops returning `false`.
    pub fn unsubscribe(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.registry
            .upgrade()
            .map_or(false, |registry| registry.release(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
