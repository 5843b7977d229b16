//! Expense record model.
//!
//! # Responsibility
//! - Define the persisted expense shape and its create-request counterpart.
//! - Provide validation shared by adapters and the sync controller.
//!
//! # Invariants
//! - `id` is assigned by the persistence layer and never reused.
//! - `created_at` is only used for ordering; it carries no calendar meaning.

use crate::model::amount::Amount;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned by the persistence layer on creation.
pub type ExpenseId = Uuid;

/// Maximum memo length in characters.
pub const MEMO_MAX_CHARS: usize = 200;

/// Validation failures reported before any persistence request is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    /// Memo is empty after trimming.
    EmptyMemo,
    /// Memo exceeds `MEMO_MAX_CHARS`.
    MemoTooLong { max_chars: usize, actual: usize },
    /// Amount input is not a number in the configured currency scale.
    InvalidAmount(String),
    /// Amount is zero or negative.
    NonPositiveAmount,
    /// Amount exceeds `Amount::MAX` minor units.
    AmountTooLarge { max: i64 },
    /// Nil UUID is reserved and cannot identify an expense.
    NilId,
}

impl Display for ExpenseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMemo => write!(f, "memo must not be empty"),
            Self::MemoTooLong { max_chars, actual } => {
                write!(f, "memo is {actual} characters long; at most {max_chars} allowed")
            }
            Self::InvalidAmount(input) => write!(f, "amount `{input}` is not a valid number"),
            Self::NonPositiveAmount => write!(f, "amount must be greater than zero"),
            Self::AmountTooLarge { max } => {
                write!(f, "amount exceeds the maximum of {max} minor units")
            }
            Self::NilId => write!(f, "expense id must not be nil"),
        }
    }
}

impl Error for ExpenseValidationError {}

/// Checks the memo contract without altering the stored text.
///
/// Length is counted in chars after trimming.
pub fn validate_memo(memo: &str) -> Result<(), ExpenseValidationError> {
    let trimmed = memo.trim();
    if trimmed.is_empty() {
        return Err(ExpenseValidationError::EmptyMemo);
    }
    let actual = trimmed.chars().count();
    if actual > MEMO_MAX_CHARS {
        return Err(ExpenseValidationError::MemoTooLong {
            max_chars: MEMO_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Create request handed to a persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub amount: Amount,
    pub memo: String,
    /// Epoch milliseconds assigned at submit time.
    pub created_at: i64,
}

impl NewExpense {
    /// Builds a validated create request.
    pub fn new(
        amount: Amount,
        memo: impl Into<String>,
        created_at: i64,
    ) -> Result<Self, ExpenseValidationError> {
        let request = Self {
            amount,
            memo: memo.into(),
            created_at,
        };
        request.validate()?;
        Ok(request)
    }

    /// Re-checks invariants; adapters call this before writing.
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        validate_memo(&self.memo)
    }
}

/// Persisted expense record as delivered in snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Amount,
    pub memo: String,
    /// Epoch milliseconds; snapshots are ordered by this field, newest first.
    pub created_at: i64,
}

impl Expense {
    /// Materializes a create request under an adapter-assigned id.
    pub fn from_request(id: ExpenseId, request: &NewExpense) -> Result<Self, ExpenseValidationError> {
        let expense = Self {
            id,
            amount: request.amount,
            memo: request.memo.clone(),
            created_at: request.created_at,
        };
        expense.validate()?;
        Ok(expense)
    }

    /// Validates a record, used on both write and read paths.
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.id.is_nil() {
            return Err(ExpenseValidationError::NilId);
        }
        validate_memo(&self.memo)
    }
}
