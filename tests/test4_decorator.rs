use std::sync::Arc;

use rowsql::test_utils::{MockDriver, MockRows};
use rowsql::{Connection, Decorator, Params, RowSqlError, Value};

fn ledger_rows() -> MockRows {
    MockRows::new(
        &["debit", "credit"],
        vec![vec![Value::Int(70), Value::Int(30)]],
    )
}

fn balance_decorator() -> Arc<Decorator> {
    Arc::new(Decorator::new("balance").op("balance", |row| {
        let debit = row.get("debit").and_then(Value::as_int).unwrap_or(0);
        let credit = row.get("credit").and_then(Value::as_int).unwrap_or(0);
        Ok(Value::Int(debit - credit))
    }))
}

#[test]
fn decorated_rows_expose_operations() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let conn = Connection::new(driver);
    handle.push_result(ledger_rows());

    let rows = conn
        .query_decorator(&balance_decorator(), "select debit, credit from ledger", &Params::none())
        .unwrap();
    assert!(rows[0].has_operation("balance"));
    assert_eq!(rows[0].invoke("balance").unwrap(), Value::Int(40));
}

#[test]
fn plain_rows_on_same_shape_never_leak_decorator_operations() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let conn = Connection::new(driver);

    handle.push_result(ledger_rows());
    handle.push_result(ledger_rows());

    let decorated = conn
        .query_decorator(&balance_decorator(), "select debit, credit from ledger", &Params::none())
        .unwrap();
    let plain = conn
        .query("select debit, credit from ledger", &Params::none())
        .unwrap();

    assert!(decorated[0].has_operation("balance"));
    assert!(!plain[0].has_operation("balance"));
    assert!(matches!(
        plain[0].invoke("balance"),
        Err(RowSqlError::UnknownOperation(_))
    ));
    // The decorated variant is a distinct accessor, not a mutated base.
    assert!(!Arc::ptr_eq(decorated[0].shape(), plain[0].shape()));
}

#[test]
fn repeated_decorator_use_reuses_the_derived_accessor() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let conn = Connection::new(driver);

    handle.push_result(ledger_rows());
    handle.push_result(ledger_rows());

    let decorator = balance_decorator();
    let first = conn
        .query_decorator(&decorator, "select debit, credit from ledger", &Params::none())
        .unwrap();
    let second = conn
        .query_decorator(&decorator, "select debit, credit from ledger", &Params::none())
        .unwrap();
    assert!(Arc::ptr_eq(first[0].shape(), second[0].shape()));
}

#[test]
fn different_decorators_on_one_shape_do_not_collide() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let conn = Connection::new(driver);

    handle.push_result(ledger_rows());
    handle.push_result(ledger_rows());

    let sum = Arc::new(Decorator::new("sum").op("sum", |row| {
        let debit = row.get("debit").and_then(Value::as_int).unwrap_or(0);
        let credit = row.get("credit").and_then(Value::as_int).unwrap_or(0);
        Ok(Value::Int(debit + credit))
    }));

    let balanced = conn
        .query_decorator(&balance_decorator(), "select debit, credit from ledger", &Params::none())
        .unwrap();
    let summed = conn
        .query_decorator(&sum, "select debit, credit from ledger", &Params::none())
        .unwrap();

    assert!(balanced[0].has_operation("balance"));
    assert!(!balanced[0].has_operation("sum"));
    assert!(summed[0].has_operation("sum"));
    assert!(!summed[0].has_operation("balance"));
    assert_eq!(summed[0].invoke("sum").unwrap(), Value::Int(100));
}
