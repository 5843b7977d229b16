use okozukai_core::{
    EntryDraft, ExpenseStore, ExpenseValidationError, ManualClock, MemoryExpenseStore,
    SqliteExpenseStore, StoreError, SyncController, SyncError, SyncState,
};
use std::rc::Rc;
use std::sync::Arc;

fn memos<S: ExpenseStore>(controller: &SyncController<S>) -> Vec<String> {
    controller
        .ledger()
        .list()
        .iter()
        .map(|record| record.memo.clone())
        .collect()
}

fn listed_sum<S: ExpenseStore>(controller: &SyncController<S>) -> i64 {
    controller
        .ledger()
        .list()
        .iter()
        .map(|record| record.amount.minor_units())
        .sum()
}

fn active_controller<S: ExpenseStore>(store: S) -> (SyncController<S>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let mut controller = SyncController::new(store).with_clock(Arc::clone(&clock));
    controller.activate().unwrap();
    assert_eq!(controller.sync_pending(), 1);
    (controller, clock)
}

fn lunch_then_book_scenario<S: ExpenseStore>(store: S) {
    let (mut controller, clock) = active_controller(store);

    controller.submit_entry("500", "lunch").unwrap();
    clock.advance(1_000);
    controller.submit_entry("1200", "book").unwrap();
    assert_eq!(controller.sync_pending(), 2);

    assert_eq!(memos(&controller), vec!["book", "lunch"]);
    assert_eq!(controller.ledger().total(), 1700);

    let deleted = controller.delete_at(0).unwrap();
    assert_eq!(deleted, controller.ledger().get(0).map(|record| record.id));
    controller.sync_pending();
    assert_eq!(memos(&controller), vec!["lunch"]);
    assert_eq!(controller.ledger().total(), 500);
}

#[test]
fn lunch_then_book_with_memory_store() {
    lunch_then_book_scenario(MemoryExpenseStore::new());
}

#[test]
fn lunch_then_book_with_sqlite_store() {
    lunch_then_book_scenario(SqliteExpenseStore::open_in_memory().unwrap());
}

#[test]
fn activation_applies_existing_records() {
    let store = SqliteExpenseStore::open_in_memory().unwrap();
    {
        let mut writer = SyncController::new(&store);
        writer.submit_entry("250", "bus").unwrap();
    }

    let mut controller = SyncController::new(&store);
    assert!(controller.ledger().is_empty());
    controller.activate().unwrap();
    assert_eq!(controller.state(), SyncState::Subscribed);
    assert_eq!(controller.sync_pending(), 1);
    assert_eq!(memos(&controller), vec!["bus"]);
}

#[test]
fn submit_does_not_insert_optimistically() {
    let (mut controller, _clock) = active_controller(MemoryExpenseStore::new());

    controller.submit_entry("300", "coffee").unwrap();
    assert!(controller.ledger().is_empty());
    assert_eq!(controller.ledger().total(), 0);

    controller.sync_pending();
    assert_eq!(controller.ledger().len(), 1);
}

#[test]
fn successful_submit_clears_draft() {
    let (mut controller, _clock) = active_controller(MemoryExpenseStore::new());
    *controller.draft_mut() = EntryDraft::new("1,200", "book");

    controller.submit().unwrap();
    assert!(controller.draft().is_empty());
}

#[test]
fn invalid_input_issues_no_request_and_changes_nothing() {
    let (mut controller, _clock) = active_controller(MemoryExpenseStore::new());
    controller.submit_entry("100", "seed").unwrap();
    controller.sync_pending();
    let revision = controller.ledger().revision();

    let cases = [
        ("0", "lunch"),
        ("-500", "lunch"),
        ("", "lunch"),
        ("abc", "lunch"),
        ("500", ""),
        ("500", "   "),
    ];
    for (amount, memo) in cases {
        let err = controller.submit_entry(amount, memo).unwrap_err();
        assert!(
            matches!(err, SyncError::Validation(_)),
            "({amount:?}, {memo:?}) should fail validation"
        );
        assert_eq!(controller.draft(), &EntryDraft::new(amount, memo));
    }

    assert_eq!(controller.sync_pending(), 0);
    assert_eq!(controller.ledger().revision(), revision);
    assert_eq!(controller.store().query().unwrap().len(), 1);
}

#[test]
fn blank_memo_reports_empty_memo() {
    let mut controller = SyncController::new(MemoryExpenseStore::new());
    let err = controller.submit_entry("500", " \t").unwrap_err();
    assert!(matches!(
        err,
        SyncError::Validation(ExpenseValidationError::EmptyMemo)
    ));
}

#[test]
fn currency_scale_controls_fractional_input() {
    let mut controller = SyncController::new(MemoryExpenseStore::new()).with_currency_scale(2);
    controller.activate().unwrap();
    controller.submit_entry("12.50", "sandwich").unwrap();
    controller.sync_pending();
    assert_eq!(controller.ledger().total(), 1250);

    let err = controller.submit_entry("1.005", "too precise").unwrap_err();
    assert!(matches!(
        err,
        SyncError::Validation(ExpenseValidationError::InvalidAmount(_))
    ));
}

#[test]
fn total_matches_listed_amounts_through_creates_and_deletes() {
    let (mut controller, clock) = active_controller(SqliteExpenseStore::open_in_memory().unwrap());

    for (step, amount) in [120, 45, 3000, 999, 1].iter().enumerate() {
        clock.advance(10);
        controller
            .submit_entry(&amount.to_string(), &format!("item {step}"))
            .unwrap();
        controller.sync_pending();
        assert_eq!(controller.ledger().total(), listed_sum(&controller));
    }

    for index in [2, 0, 1] {
        controller.delete_at(index).unwrap();
        controller.sync_pending();
        assert_eq!(controller.ledger().total(), listed_sum(&controller));
    }
    assert_eq!(controller.ledger().len(), 2);
}

#[test]
fn list_stays_descending_by_created_at() {
    let (mut controller, clock) = active_controller(MemoryExpenseStore::new());

    for (created_at, memo) in [(30, "c"), (10, "a"), (20, "b")] {
        clock.set(created_at);
        controller.submit_entry("1", memo).unwrap();
    }
    controller.sync_pending();

    let stamps: Vec<i64> = controller
        .ledger()
        .list()
        .iter()
        .map(|record| record.created_at)
        .collect();
    assert_eq!(stamps, vec![30, 20, 10]);
}

#[test]
fn delete_at_targets_displayed_row_even_after_concurrent_insert() {
    let store = Rc::new(MemoryExpenseStore::new());
    let clock = Arc::new(ManualClock::new(100));
    let mut view = SyncController::new(Rc::clone(&store)).with_clock(Arc::clone(&clock));
    let mut other_tab = SyncController::new(Rc::clone(&store)).with_clock(Arc::clone(&clock));
    view.activate().unwrap();

    view.submit_entry("500", "lunch").unwrap();
    clock.advance(1);
    view.submit_entry("1200", "book").unwrap();
    view.sync_pending();
    assert_eq!(memos(&view), vec!["book", "lunch"]);

    // A newer record lands before this view applies the next snapshot.
    clock.advance(1);
    other_tab.submit_entry("9999", "newer elsewhere").unwrap();

    let target = view.delete_at(0).unwrap().expect("row 0 is displayed");
    view.sync_pending();

    assert!(view.ledger().position(target).is_none());
    assert_eq!(memos(&view), vec!["newer elsewhere", "lunch"]);
}

#[test]
fn deleting_already_removed_record_is_noop() {
    let store = Rc::new(MemoryExpenseStore::new());
    let mut first = SyncController::new(Rc::clone(&store));
    let mut second = SyncController::new(Rc::clone(&store));
    first.activate().unwrap();
    second.activate().unwrap();

    first.submit_entry("700", "dinner").unwrap();
    first.sync_pending();
    second.sync_pending();

    assert!(first.delete_at(0).unwrap().is_some());
    let stale_id = second.ledger().get(0).unwrap().id;
    assert!(!second.delete(stale_id).unwrap());

    second.sync_pending();
    assert!(second.ledger().is_empty());
}

#[test]
fn deactivate_is_idempotent_and_stops_updates() {
    let store = Rc::new(MemoryExpenseStore::new());
    let mut controller = SyncController::new(Rc::clone(&store));

    assert!(!controller.deactivate());
    controller.activate().unwrap();
    controller.activate().unwrap();
    assert_eq!(store.subscriber_count(), 1);

    assert!(controller.deactivate());
    assert!(!controller.deactivate());
    assert_eq!(controller.state(), SyncState::Unsubscribed);
    assert_eq!(store.subscriber_count(), 0);

    controller.submit_entry("100", "after teardown").unwrap();
    assert_eq!(controller.sync_pending(), 0);
    assert!(controller.ledger().is_empty());
}

#[test]
fn dropping_controller_releases_subscription() {
    let store = Rc::new(MemoryExpenseStore::new());
    {
        let mut controller = SyncController::new(Rc::clone(&store));
        controller.activate().unwrap();
        assert_eq!(store.subscriber_count(), 1);
    }
    assert_eq!(store.subscriber_count(), 0);
}

#[test]
fn persistence_failure_is_reported_and_state_is_kept() {
    let store = Rc::new(MemoryExpenseStore::new());
    let mut controller = SyncController::new(Rc::clone(&store));
    controller.activate().unwrap();
    controller.submit_entry("400", "snack").unwrap();
    controller.sync_pending();

    store.set_available(false);
    let err = controller.submit_entry("900", "ticket").unwrap_err();
    assert!(matches!(
        err,
        SyncError::PersistenceUnavailable(StoreError::Unavailable(_))
    ));
    assert_eq!(controller.draft(), &EntryDraft::new("900", "ticket"));

    let err = controller.delete_at(0).unwrap_err();
    assert!(matches!(err, SyncError::PersistenceUnavailable(_)));

    assert_eq!(controller.sync_pending(), 0);
    assert_eq!(memos(&controller), vec!["snack"]);
    assert_eq!(controller.ledger().total(), 400);

    store.set_available(true);
    controller.submit().unwrap();
    controller.sync_pending();
    assert_eq!(controller.ledger().total(), 1300);
}

#[test]
fn activation_failure_leaves_controller_unsubscribed() {
    let store = Rc::new(MemoryExpenseStore::new());
    store.set_available(false);
    let mut controller = SyncController::new(Rc::clone(&store));

    assert!(matches!(
        controller.activate(),
        Err(SyncError::PersistenceUnavailable(_))
    ));
    assert_eq!(controller.state(), SyncState::Unsubscribed);
}

#[test]
fn empty_snapshot_resets_total() {
    let (mut controller, _clock) = active_controller(MemoryExpenseStore::new());
    controller.submit_entry("800", "gift").unwrap();
    controller.sync_pending();
    assert_eq!(controller.ledger().total(), 800);

    controller.delete_at(0).unwrap();
    controller.sync_pending();
    assert_eq!(controller.ledger().total(), 0);
    assert!(controller.ledger().list().is_empty());
}

#[test]
fn boxed_store_composes_like_concrete_one() {
    let store: Box<dyn ExpenseStore> = Box::new(MemoryExpenseStore::new());
    let mut controller = SyncController::new(store);
    controller.activate().unwrap();
    controller.submit_entry("42", "boxed").unwrap();
    controller.sync_pending();
    assert_eq!(controller.store().backend(), "memory");
    assert_eq!(controller.ledger().total(), 42);
}
