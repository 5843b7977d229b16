//! Expense domain model.
//!
//! # Responsibility
//! - Define the canonical expense record shared by every persistence backend.
//! - Own amount parsing/display rules so views never do money arithmetic.
//!
//! # Invariants
//! - Every persisted expense is identified by a stable, non-nil `ExpenseId`.
//! - Amounts are strictly positive integer counts of minor currency units.
//! - Memos are never blank after trimming.

pub mod amount;
pub mod expense;
