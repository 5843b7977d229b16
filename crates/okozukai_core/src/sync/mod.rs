//! Ledger synchronization.
//!
//! # Responsibility
//! - Fan out full snapshots from persistence adapters (`feed`).
//! - Keep one view's ledger in step with its adapter (`controller`).
//!
//! # Invariants
//! - Snapshots replace the ledger wholesale; nothing is merged.

pub mod clock;
pub mod controller;
pub mod feed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{EntryDraft, SyncController, SyncError, SyncState};
pub use feed::{ExpenseSnapshot, SnapshotReceiver, SubscriberRegistry, Subscription};
