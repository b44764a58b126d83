use rowsql::test_utils::{MockDriver, MockRows};
use rowsql::{
    Connection, ConnectionConfig, DriverError, DriverErrorKind, Params, PreparedCache,
    RowSqlError, Value,
};

#[test]
fn repeat_query_prepares_once_and_executes_twice() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let conn = Connection::new(driver);
    handle.push_result(MockRows::new(&["n"], vec![vec![Value::Int(1)]]));
    handle.push_result(MockRows::new(&["n"], vec![vec![Value::Int(2)]]));

    let prepared = conn.prepared();
    prepared
        .query("select n from t where id = ?", &Params::positional([Value::Int(1)]))
        .unwrap();
    prepared
        .query("select n from t where id = ?", &Params::positional([Value::Int(2)]))
        .unwrap();

    let log = handle.log();
    assert_eq!(log.prepares.len(), 1);
    assert_eq!(log.prepares[0].1, "select n from t where id = $1");
    assert_eq!(log.prepared_executes.len(), 2);
    assert_eq!(log.prepared_executes[0].1, vec![Value::Int(1)]);
    assert_eq!(log.prepared_executes[1].1, vec![Value::Int(2)]);
}

#[test]
fn stale_statement_triggers_exactly_one_retry() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let conn = Connection::new(driver);
    handle.push_result(MockRows::new(&["n"], vec![vec![Value::Int(1)]]));
    handle.fail_next_prepared_execute(DriverError::new(
        DriverErrorKind::StaleStatement,
        "cached plan must not change result type",
    ));

    let rows = conn
        .prepared()
        .query("select n from t", &Params::none())
        .unwrap();
    assert_eq!(rows[0].get("n"), Some(&Value::Int(1)));

    let log = handle.log();
    // Initial prepare, then one re-prepare after invalidation.
    assert_eq!(log.prepares.len(), 2);
    assert_eq!(log.prepared_executes.len(), 2);
    assert_eq!(log.deallocates.len(), 1);
}

#[test]
fn recurring_stale_statement_propagates() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let conn = Connection::new(driver);
    for _ in 0..2 {
        handle.fail_next_prepared_execute(DriverError::new(
            DriverErrorKind::StaleStatement,
            "cached plan must not change result type",
        ));
    }

    let err = conn
        .prepared()
        .query("select n from t", &Params::none())
        .unwrap_err();
    match err {
        RowSqlError::Driver(driver_err) => assert!(driver_err.is_stale_statement()),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(handle.log().prepared_executes.len(), 2);
}

#[test]
fn eviction_deallocates_server_side() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let config = ConnectionConfig {
        prepared_cache_size: 2,
        ..ConnectionConfig::default()
    };
    let conn = Connection::with_config(driver, config);

    let prepared = conn.prepared();
    prepared.query("select 1", &Params::none()).unwrap();
    prepared.query("select 2", &Params::none()).unwrap();
    prepared.query("select 3", &Params::none()).unwrap();

    let log = handle.log();
    assert_eq!(log.prepares.len(), 3);
    // "select 1" was least recently used.
    assert_eq!(log.deallocates, vec!["s1".to_string()]);
    assert_eq!(handle.live_statements(), vec!["s2".to_string(), "s3".to_string()]);
}

#[test]
fn cache_hits_refresh_recency_before_eviction() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let config = ConnectionConfig {
        prepared_cache_size: 2,
        ..ConnectionConfig::default()
    };
    let conn = Connection::with_config(driver, config);

    let prepared = conn.prepared();
    prepared.query("select 1", &Params::none()).unwrap();
    prepared.query("select 2", &Params::none()).unwrap();
    // Re-run the first statement so "select 2" becomes LRU.
    prepared.query("select 1", &Params::none()).unwrap();
    prepared.query("select 3", &Params::none()).unwrap();

    assert_eq!(handle.log().deallocates, vec!["s2".to_string()]);
}

#[test]
fn deallocate_failures_on_dead_connections_are_ignored() {
    let driver = MockDriver::new();
    let handle = driver.clone();
    let config = ConnectionConfig {
        prepared_cache_size: 1,
        ..ConnectionConfig::default()
    };
    let conn = Connection::with_config(driver, config);
    handle.set_broken_deallocate(true);

    let prepared = conn.prepared();
    prepared.query("select 1", &Params::none()).unwrap();
    // Evicting "select 1" fails to deallocate; the query still succeeds.
    prepared.query("select 2", &Params::none()).unwrap();

    let log = handle.log();
    assert_eq!(log.deallocates, vec!["s1".to_string()]);
    assert_eq!(log.prepares.len(), 2);
}

#[test]
fn statement_keys_are_scoped_per_connection() {
    let mut first = MockDriver::new();
    let mut second = MockDriver::new();
    let mut cache = PreparedCache::new(10);

    let on_first = cache.prepare_statement(&mut first, "select 1").unwrap();
    let on_second = cache.prepare_statement(&mut second, "select 1").unwrap();
    assert_ne!(on_first, on_second);
    assert_eq!(cache.len(), 2);

    // Same connection and SQL hits the cached handle.
    let again = cache.prepare_statement(&mut first, "select 1").unwrap();
    assert_eq!(again, on_first);
    assert_eq!(first.log().prepares.len(), 1);
}
