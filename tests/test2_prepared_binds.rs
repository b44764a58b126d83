use rowsql::test_utils::MockDriver;
use rowsql::{ArrayEncoder, Params, PreparedBinder, RowSqlError, SqlLiteral, Value};

fn bind(sql: &str, params: &Params) -> (String, Vec<Value>) {
    let driver = MockDriver::new();
    PreparedBinder::new(&driver).bind(sql, params).unwrap()
}

#[test]
fn positional_placeholders_become_markers() {
    let params = Params::positional([Value::Int(7), Value::Text("a".into())]);
    let (sql, binds) = bind("select * from t where a = ? and b = ?", &params);
    assert_eq!(sql, "select * from t where a = $1 and b = $2");
    assert_eq!(binds, vec![Value::Int(7), Value::Text("a".into())]);
}

#[test]
fn named_placeholders_bind_in_template_order() {
    let params = Params::named([("b", Value::Int(2)), ("a", Value::Int(1))]);
    let (sql, binds) = bind("select :a, :b", &params);
    assert_eq!(sql, "select $1, $2");
    assert_eq!(binds, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn typecast_suffix_survives_binding() {
    let params = Params::named([("x", Value::Int(5))]);
    let (sql, binds) = bind("select :x::int", &params);
    assert_eq!(sql, "select $1::int");
    assert_eq!(binds, vec![Value::Int(5)]);
}

#[test]
fn arrays_expand_to_consecutive_markers() {
    let params = Params::positional([
        Value::Text("first".into()),
        Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    ]);
    let (sql, binds) = bind("select * from t where a = ? and id in (?)", &params);
    assert_eq!(sql, "select * from t where a = $1 and id in ($2, $3, $4)");
    assert_eq!(binds.len(), 4);
    assert_eq!(binds[1], Value::Int(1));
    assert_eq!(binds[3], Value::Int(3));
}

#[test]
fn empty_array_binds_null() {
    let params = Params::positional([Value::Array(vec![])]);
    let (sql, binds) = bind("select * from t where id in (?)", &params);
    assert_eq!(sql, "select * from t where id in ($1)");
    assert_eq!(binds, vec![Value::Null]);
}

struct PassthroughArrayEncoder;

impl ArrayEncoder for PassthroughArrayEncoder {
    fn encode_literal(&self, _values: &[Value]) -> Result<String, RowSqlError> {
        unreachable!("bind mode only")
    }

    fn encode_bind(&self, values: &[Value]) -> Result<Value, RowSqlError> {
        Ok(Value::Array(values.to_vec()))
    }
}

#[test]
fn array_encoder_collapses_array_to_single_bind() {
    let driver = MockDriver::new();
    let encoder = PassthroughArrayEncoder;
    let binder = PreparedBinder::with_array_encoder(&driver, Some(&encoder));
    let params = Params::positional([Value::Array(vec![Value::Int(1), Value::Int(2)])]);
    let (sql, binds) = binder.bind("select * from t where id = any(?)", &params).unwrap();
    assert_eq!(sql, "select * from t where id = any($1)");
    assert_eq!(binds, vec![Value::Array(vec![Value::Int(1), Value::Int(2)])]);
}

#[test]
fn literal_fragments_are_spliced_not_bound() {
    let params = Params::positional([
        Value::Literal(SqlLiteral::new("now()")),
        Value::Int(3),
    ]);
    let (sql, binds) = bind("update t set at = ?, n = ?", &params);
    assert_eq!(sql, "update t set at = now(), n = $1");
    assert_eq!(binds, vec![Value::Int(3)]);
}

#[test]
fn binding_is_idempotent() {
    let params = Params::named([("a", Value::Int(1)), ("a2", Value::Int(2))]);
    let driver = MockDriver::new();
    let binder = PreparedBinder::new(&driver);
    let first = binder.bind("select :a, :a2", &params).unwrap();
    let second = binder.bind("select :a, :a2", &params).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.0, "select $1, $2");
}
