use okozukai_core::db::migrations::latest_version;
use okozukai_core::db::open_db_in_memory;
use okozukai_core::{
    Amount, Expense, ExpenseStore, MemoryExpenseStore, NewExpense, SqliteExpenseStore, StoreError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn request(amount: i64, memo: &str, created_at: i64) -> NewExpense {
    NewExpense::new(Amount::new(amount).unwrap(), memo, created_at).unwrap()
}

fn memos(records: &[Expense]) -> Vec<&str> {
    records.iter().map(|record| record.memo.as_str()).collect()
}

/// Contract checks run against every backend.
fn exercise_store_contract(store: &dyn ExpenseStore) {
    let lunch = store.create(&request(500, "lunch", 1_000)).unwrap();
    let book = store.create(&request(1200, "book", 2_000)).unwrap();
    let tie = store.create(&request(80, "gum", 2_000)).unwrap();

    let listed = store.query().unwrap();
    assert_eq!(memos(&listed), vec!["gum", "book", "lunch"]);
    assert_eq!(listed[0].id, tie);
    assert_eq!(listed[1].amount.minor_units(), 1200);
    assert_eq!(listed[2].created_at, 1_000);

    assert!(store.delete_by_id(book).unwrap());
    assert!(!store.delete_by_id(book).unwrap());
    assert!(!store.delete_by_id(Uuid::new_v4()).unwrap());

    let listed = store.query().unwrap();
    assert_eq!(memos(&listed), vec!["gum", "lunch"]);
    assert_eq!(listed[1].id, lunch);
}

/// Subscription checks run against every backend.
fn exercise_subscription_contract(store: &dyn ExpenseStore) {
    let existing = store.create(&request(300, "coffee", 10)).unwrap();
    let (receiver, mut subscription) = store.subscribe().unwrap();

    let initial = receiver.try_recv().unwrap();
    assert_eq!(initial.records.len(), 1);
    assert_eq!(initial.records[0].id, existing);

    store.create(&request(700, "bento", 20)).unwrap();
    let after_create = receiver.try_recv().unwrap();
    assert_eq!(memos(&after_create.records), vec!["bento", "coffee"]);
    assert!(after_create.version > initial.version);

    assert!(!store.delete_by_id(Uuid::new_v4()).unwrap());
    assert!(receiver.try_recv().is_err(), "no-op delete must not notify");

    store.delete_by_id(existing).unwrap();
    let after_delete = receiver.try_recv().unwrap();
    assert_eq!(memos(&after_delete.records), vec!["bento"]);

    assert!(subscription.unsubscribe());
    assert!(!subscription.unsubscribe());
    store.create(&request(1, "after", 30)).unwrap();
    assert!(receiver.try_recv().is_err());
}

#[test]
fn memory_store_honors_contract() {
    exercise_store_contract(&MemoryExpenseStore::new());
}

#[test]
fn sqlite_store_honors_contract() {
    exercise_store_contract(&SqliteExpenseStore::open_in_memory().unwrap());
}

#[test]
fn memory_store_honors_subscription_contract() {
    exercise_subscription_contract(&MemoryExpenseStore::new());
}

#[test]
fn sqlite_store_honors_subscription_contract() {
    exercise_subscription_contract(&SqliteExpenseStore::open_in_memory().unwrap());
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.sqlite3");

    let id = {
        let store = SqliteExpenseStore::open(&path).unwrap();
        store.create(&request(1500, "movie", 5)).unwrap()
    };

    let reopened = SqliteExpenseStore::open(&path).unwrap();
    let records = reopened.query().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].memo, "movie");
}

#[test]
fn dropped_subscription_is_released_on_store() {
    let store = SqliteExpenseStore::open_in_memory().unwrap();
    let (_receiver, subscription) = store.subscribe().unwrap();
    assert_eq!(store.subscriber_count(), 1);
    drop(subscription);
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn sqlite_store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteExpenseStore::try_new(conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn sqlite_store_rejects_connection_without_expenses_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteExpenseStore::try_new(conn),
        Err(StoreError::MissingRequiredTable("expenses"))
    ));
}

#[test]
fn sqlite_store_rejects_corrupted_rows_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO expenses (uuid, amount, memo, created_at)
         VALUES ('not-a-uuid', 100, 'tea', 1);",
        [],
    )
    .unwrap();
    let store = SqliteExpenseStore::try_new(conn).unwrap();

    assert!(matches!(store.query(), Err(StoreError::InvalidData(_))));
    assert!(matches!(store.subscribe(), Err(StoreError::InvalidData(_))));
}

#[test]
fn sqlite_store_rejects_blank_memo_rows_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO expenses (uuid, amount, memo, created_at)
         VALUES ('11111111-2222-4333-8444-555555555555', 100, '   ', 1);",
        [],
    )
    .unwrap();
    let store = SqliteExpenseStore::try_new(conn).unwrap();

    assert!(matches!(store.query(), Err(StoreError::InvalidData(_))));
}

#[test]
fn create_rejects_invalid_requests_before_writing() {
    let store = SqliteExpenseStore::open_in_memory().unwrap();
    let invalid = NewExpense {
        amount: Amount::new(10).unwrap(),
        memo: "  ".to_string(),
        created_at: 1,
    };

    assert!(matches!(
        store.create(&invalid),
        Err(StoreError::Validation(_))
    ));
    assert!(store.query().unwrap().is_empty());
}

#[test]
fn sqlite_store_reports_write_failures_as_db_errors() {
    let store = SqliteExpenseStore::open_in_memory().unwrap();
    let kept = store.create(&request(100, "tea", 1)).unwrap();
    store
        .connection()
        .execute_batch("DROP TABLE expenses;")
        .unwrap();

    assert!(matches!(store.delete_by_id(kept), Err(StoreError::Db(_))));
    assert!(matches!(
        store.create(&request(200, "cake", 2)),
        Err(StoreError::Db(_))
    ));
}
