//! Native driver connections.
//!
//! Every connection is opened per request and closed by the executor.

pub mod mariadb;
pub mod mssql;
pub mod oracle;
pub mod postgres;

use polycrud_core::{CrudError, Dialect, Result, TypedParam};
use serde_json::Value;
use sqlx::{ColumnIndex, Decode, Row, Type};

pub use mariadb::MariaDbConnection;
pub use mssql::MssqlConnection;
pub use self::oracle::OracleConnection;
pub use postgres::PostgresConnection;

/// How a result column is turned into JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    Bool,
    Int2,
    Int4,
    Int8,
    UInt8,
    Float4,
    Float8,
    /// Exact decimal, emitted as a string.
    Decimal,
    Json,
    Uuid,
    Text,
    Date,
    Time,
    Timestamp,
    TimestampTz,
}

/// Reads column `index` as `T` and converts it with `to_json`; SQL NULL is `null`.
fn cell<'r, R, T>(
    row: &'r R,
    index: usize,
    column: &str,
    to_json: impl FnOnce(T) -> Value,
) -> Result<Value>
where
    R: Row,
    T: Decode<'r, R::Database> + Type<R::Database>,
    usize: ColumnIndex<R>,
{
    row.try_get::<Option<T>, _>(index)
        .map(|value| value.map_or(Value::Null, to_json))
        .map_err(|err| CrudError::Driver(format!("cannot decode column '{column}': {err}")))
}

fn text<T: ToString>(value: T) -> Value {
    Value::String(value.to_string())
}

fn unsupported_column(column: &str, sql_type: &str) -> CrudError {
    CrudError::Driver(format!(
        "column '{column}' has type {sql_type}, which cannot be returned as JSON"
    ))
}

fn bind_mismatch(dialect: Dialect, param: &TypedParam) -> CrudError {
    CrudError::UnsupportedType {
        dialect,
        field: param.name.clone(),
        message: format!(
            "cannot bind {} value as {}",
            param.value.type_name(),
            param.descriptor
        ),
    }
}
