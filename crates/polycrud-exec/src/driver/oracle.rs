//! Oracle connection.
//!
//! The `oracle` crate is blocking, so connecting and every statement run on
//! tokio's blocking pool.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use futures::future::BoxFuture;
use polycrud_core::{
    CrudError, Dialect, ParamValue, RawResult, Result, Row as JsonRow, TypeKind, TypedParam,
};
use serde_json::Value;

use ::oracle::sql_type::{FromSql, OracleType, ToSql};

use super::{bind_mismatch, text, unsupported_column};
use crate::config::ConnectionConfig;
use crate::connection::{BoundStatement, Connection};

/// A single, unpooled Oracle connection.
pub struct OracleConnection {
    conn: Option<::oracle::Connection>,
}

impl OracleConnection {
    /// Opens a connection.
    ///
    /// Uses the configured connect descriptor, or `host:port/database` when
    /// none is set.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let user = config.user.clone();
        let password = config.password.clone();
        let connect_string = connect_string(config);

        let conn = tokio::task::spawn_blocking(move || {
            ::oracle::Connection::connect(user, password, connect_string)
        })
        .await
        .map_err(|e| CrudError::Connection(e.to_string()))?
        .map_err(|e| CrudError::Connection(e.to_string()))?;
        Ok(Self { conn: Some(conn) })
    }
}

impl Connection for OracleConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn execute(&mut self, statement: BoundStatement) -> BoxFuture<'_, Result<RawResult>> {
        Box::pin(async move {
            let conn = self
                .conn
                .take()
                .ok_or_else(|| CrudError::Connection(String::from("connection is closed")))?;

            let (conn, result) = tokio::task::spawn_blocking(move || {
                let result = run(&conn, &statement);
                (conn, result)
            })
            .await
            .map_err(|e| CrudError::Driver(e.to_string()))?;

            self.conn = Some(conn);
            result
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            let Some(conn) = self.conn else {
                return Ok(());
            };
            tokio::task::spawn_blocking(move || conn.close())
                .await
                .map_err(|e| CrudError::Connection(e.to_string()))?
                .map_err(|e| CrudError::Connection(e.to_string()))
        })
    }
}

fn connect_string(config: &ConnectionConfig) -> String {
    config.oracle_connect_string.clone().unwrap_or_else(|| {
        format!(
            "{}:{}/{}",
            config.host,
            config.port_for(Dialect::Oracle),
            config.database
        )
    })
}

/// Runs one statement with `:name` binds, committing DML.
fn run(conn: &::oracle::Connection, statement: &BoundStatement) -> Result<RawResult> {
    let values = statement
        .binds
        .params()
        .map(|param| bind_value(param).map(|v| (param.name.as_str(), v)))
        .collect::<Result<Vec<_>>>()?;
    let binds: Vec<(&str, &dyn ToSql)> = values.iter().map(|(name, v)| (*name, &**v)).collect();

    let mut stmt = conn
        .statement(&statement.sql)
        .build()
        .map_err(|e| CrudError::Driver(e.to_string()))?;

    if statement.returns_rows() {
        let rows = stmt
            .query_named(&binds)
            .map_err(|e| CrudError::Driver(e.to_string()))?;
        let columns: Vec<(String, OracleType)> = rows
            .column_info()
            .iter()
            .map(|c| (String::from(c.name()), c.oracle_type().clone()))
            .collect();

        let mut out = Vec::new();
        for row in rows {
            let row = row.map_err(|e| CrudError::Driver(e.to_string()))?;
            out.push(to_json(&row, &columns)?);
        }
        return Ok(RawResult::Oracle {
            rows: Some(out),
            rows_affected: None,
        });
    }

    stmt.execute_named(&binds)
        .map_err(|e| CrudError::Driver(e.to_string()))?;
    let affected = stmt
        .row_count()
        .map_err(|e| CrudError::Driver(e.to_string()))?;
    conn.commit()
        .map_err(|e| CrudError::Driver(e.to_string()))?;
    Ok(RawResult::Oracle {
        rows: None,
        rows_affected: Some(affected),
    })
}

fn bind_value(param: &TypedParam) -> Result<Box<dyn ToSql>> {
    let value: Box<dyn ToSql> = match (param.descriptor.kind, &param.value) {
        (
            TypeKind::Identifier | TypeKind::BoundedText | TypeKind::UnboundedText,
            ParamValue::Null,
        ) => Box::new(None::<String>),
        (
            TypeKind::Identifier | TypeKind::BoundedText | TypeKind::UnboundedText,
            ParamValue::Text(s),
        ) => Box::new(s.clone()),
        (TypeKind::Boolean, ParamValue::Null) => Box::new(None::<bool>),
        (TypeKind::Boolean, ParamValue::Bool(b)) => Box::new(*b),
        (TypeKind::Integer, ParamValue::Null) => Box::new(None::<i64>),
        (TypeKind::Integer, ParamValue::Int(n)) => Box::new(*n),
        (TypeKind::Float, ParamValue::Null) => Box::new(None::<f64>),
        (TypeKind::Float, ParamValue::Float(f)) => Box::new(*f),
        _ => return Err(bind_mismatch(Dialect::Oracle, param)),
    };
    Ok(value)
}

fn to_json(row: &::oracle::Row, columns: &[(String, OracleType)]) -> Result<JsonRow> {
    let mut out = JsonRow::new();
    for (i, (name, oracle_type)) in columns.iter().enumerate() {
        let value = match oracle_type {
            OracleType::Boolean => get::<bool>(row, i, name)?.map(Value::from),
            OracleType::Int64 => get::<i64>(row, i, name)?.map(Value::from),
            OracleType::UInt64 => get::<u64>(row, i, name)?.map(Value::from),
            OracleType::BinaryFloat | OracleType::BinaryDouble | OracleType::Float(_) => {
                get::<f64>(row, i, name)?.map(Value::from)
            }
            OracleType::Number(..) => get::<String>(row, i, name)?.map(number),
            OracleType::Varchar2(_)
            | OracleType::NVarchar2(_)
            | OracleType::Char(_)
            | OracleType::NChar(_)
            | OracleType::Long
            | OracleType::CLOB
            | OracleType::NCLOB
            | OracleType::Rowid => get::<String>(row, i, name)?.map(Value::String),
            OracleType::Raw(_) => get::<Vec<u8>>(row, i, name)?.map(|b| Value::String(hex(&b))),
            OracleType::Date | OracleType::Timestamp(_) => {
                get::<NaiveDateTime>(row, i, name)?.map(text)
            }
            OracleType::TimestampTZ(_) | OracleType::TimestampLTZ(_) => {
                get::<DateTime<FixedOffset>>(row, i, name)?.map(|t| Value::String(t.to_rfc3339()))
            }
            other => return Err(unsupported_column(name, &other.to_string())),
        };
        out.insert(name.clone(), value.unwrap_or(Value::Null));
    }
    Ok(out)
}

fn get<T: FromSql>(row: &::oracle::Row, index: usize, column: &str) -> Result<Option<T>> {
    row.get::<usize, Option<T>>(index)
        .map_err(|err| CrudError::Driver(format!("cannot decode column '{column}': {err}")))
}

/// Whole numbers become JSON numbers; anything with a fraction stays exact as text.
fn number(digits: String) -> Value {
    digits
        .parse::<i64>()
        .map_or_else(|_| Value::String(digits), Value::from)
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use polycrud_core::TypeDescriptor;

    fn param(kind: TypeKind, value: ParamValue) -> TypedParam {
        TypedParam {
            name: String::from("Name"),
            descriptor: TypeDescriptor::default_for(Dialect::Oracle, kind, None),
            value,
        }
    }

    #[test]
    fn test_connect_string_prefers_descriptor() {
        let config = ConnectionConfig::new("ora.local").database("FREEPDB1");
        assert_eq!(connect_string(&config), "ora.local:1521/FREEPDB1");

        let config = config.oracle_connect_string("tcps://ora.cloud:2484/svc");
        assert_eq!(connect_string(&config), "tcps://ora.cloud:2484/svc");
    }

    #[test]
    fn test_bind_values_per_kind() {
        let cases = [
            (TypeKind::BoundedText, ParamValue::Text(String::from("x"))),
            (TypeKind::UnboundedText, ParamValue::Null),
            (TypeKind::Identifier, ParamValue::Text(String::from("u1"))),
            (TypeKind::Boolean, ParamValue::Bool(true)),
            (TypeKind::Integer, ParamValue::Int(4)),
            (TypeKind::Float, ParamValue::Float(1.5)),
        ];
        for (kind, value) in cases {
            assert!(bind_value(&param(kind, value)).is_ok(), "{kind:?}");
        }
    }

    #[test]
    fn test_bind_rejects_uncoerced_value() {
        let result = bind_value(&param(TypeKind::Integer, ParamValue::Text(String::from("4"))));
        assert!(matches!(result, Err(CrudError::UnsupportedType { .. })));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(number(String::from("42")), Value::from(42));
        assert_eq!(number(String::from("12.50")), Value::from("12.50"));
        assert_eq!(number(String::from("-7")), Value::from(-7));
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x0b, 0x6f, 0xff]), "0B6FFF");
        assert_eq!(hex(&[]), "");
    }
}
