//! In-memory ledger: the currently displayed expense snapshot.
//!
//! # Responsibility
//! - Hold the ordered records delivered by the latest snapshot.
//! - Derive the running total from those records.
//!
//! # Invariants
//! - `replace_all` is the only mutation path; there is no partial update.
//! - Record order is exactly the order the persistence adapter delivered.
//! - `total` is derived, never stored anywhere else.

mod store;

pub use store::LedgerStore;
