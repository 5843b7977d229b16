//! Expense persistence contract.

use crate::db::DbError;
use crate::model::expense::{Expense, ExpenseId, ExpenseValidationError, NewExpense};
use crate::sync::feed::{SnapshotReceiver, Subscription};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Adapter error for persistence and subscription operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(ExpenseValidationError),
    Db(DbError),
    /// Persisted row violates the expense model.
    InvalidData(String),
    /// Backend cannot be reached.
    Unavailable(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted expense data: {message}"),
            Self::Unavailable(message) => write!(f, "expense store unavailable: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with `open_db`"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ExpenseValidationError> for StoreError {
    fn from(value: ExpenseValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable (or process-local) home of expense records.
///
/// Implementations own identifier assignment and result ordering; callers
/// never re-sort what they receive.
pub trait ExpenseStore {
    /// Short backend label for diagnostics.
    fn backend(&self) -> &'static str;

    /// Appends one record and returns its assigned id.
    fn create(&self, request: &NewExpense) -> StoreResult<ExpenseId>;

    /// One-shot read of the full ordered result set.
    fn query(&self) -> StoreResult<Vec<Expense>>;

    /// Removes one record; `Ok(false)` when the id was already absent.
    fn delete_by_id(&self, id: ExpenseId) -> StoreResult<bool>;

    /// Opens a live feed that starts with the current result set.
    fn subscribe(&self) -> StoreResult<(SnapshotReceiver, Subscription)>;
}

macro_rules! forward_expense_store {
    ($($wrapper:ty),+ $(,)?) => {
        $(
            impl<S: ExpenseStore + ?Sized> ExpenseStore for $wrapper {
                fn backend(&self) -> &'static str {
                    (**self).backend()
                }

                fn create(&self, request: &NewExpense) -> StoreResult<ExpenseId> {
                    (**self).create(request)
                }

                fn query(&self) -> StoreResult<Vec<Expense>> {
                    (**self).query()
                }

                fn delete_by_id(&self, id: ExpenseId) -> StoreResult<bool> {
                    (**self).delete_by_id(id)
                }

                fn subscribe(&self) -> StoreResult<(SnapshotReceiver, Subscription)> {
                    (**self).subscribe()
                }
            }
        )+
    };
}

forward_expense_store!(&S, Box<S>, Rc<S>, Arc<S>);
