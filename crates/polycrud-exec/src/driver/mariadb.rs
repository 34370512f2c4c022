//! MariaDB / MySQL connection.

use std::convert::identity;

use futures::future::BoxFuture;
use polycrud_core::{
    Dialect, MariaDbOutcome, ParamValue, RawResult, Result, Row as JsonRow, TypeKind, TypedParam,
};
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{Decimal, JsonValue};
use sqlx::{Column, Connection as _, MySql, MySqlConnection, Row, TypeInfo};

use super::{bind_mismatch, cell, text, unsupported_column, ColumnClass};
use crate::config::ConnectionConfig;
use crate::connection::{BoundStatement, Connection};
use crate::error::{connect_error, driver_error};

type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// A single, unpooled MariaDB connection.
pub struct MariaDbConnection {
    conn: MySqlConnection,
}

impl MariaDbConnection {
    /// Opens a connection.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port_for(Dialect::MariaDb))
            .username(&config.user)
            .password(&config.password);
        if !config.database.is_empty() {
            options = options.database(&config.database);
        }

        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(connect_error)?;
        Ok(Self { conn })
    }
}

impl Connection for MariaDbConnection {
    fn dialect(&self) -> Dialect {
        Dialect::MariaDb
    }

    fn execute(&mut self, statement: BoundStatement) -> BoxFuture<'_, Result<RawResult>> {
        Box::pin(async move {
            let mut query = sqlx::query(&statement.sql);
            for param in statement.binds.params() {
                query = bind(query, param)?;
            }

            let outcome = if statement.returns_rows() {
                let rows = query
                    .fetch_all(&mut self.conn)
                    .await
                    .map_err(driver_error)?;
                MariaDbOutcome::Rows(rows.iter().map(to_json).collect::<Result<_>>()?)
            } else {
                let done = query.execute(&mut self.conn).await.map_err(driver_error)?;
                MariaDbOutcome::Ok {
                    affected_rows: done.rows_affected(),
                    last_insert_id: done.last_insert_id(),
                }
            };
            Ok(RawResult::MariaDb(outcome))
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move { self.conn.close().await.map_err(driver_error) })
    }
}

fn bind<'q>(query: MySqlQuery<'q>, param: &TypedParam) -> Result<MySqlQuery<'q>> {
    let query = match (param.descriptor.kind, &param.value) {
        (
            TypeKind::Identifier | TypeKind::BoundedText | TypeKind::UnboundedText,
            ParamValue::Null,
        ) => query.bind(None::<String>),
        (
            TypeKind::Identifier | TypeKind::BoundedText | TypeKind::UnboundedText,
            ParamValue::Text(s),
        ) => query.bind(s.clone()),
        (TypeKind::Boolean, ParamValue::Null) => query.bind(None::<bool>),
        (TypeKind::Boolean, ParamValue::Bool(b)) => query.bind(*b),
        (TypeKind::Integer, ParamValue::Null) => query.bind(None::<i64>),
        (TypeKind::Integer, ParamValue::Int(n)) => query.bind(*n),
        (TypeKind::Float, ParamValue::Null) => query.bind(None::<f64>),
        (TypeKind::Float, ParamValue::Float(f)) => query.bind(*f),
        _ => return Err(bind_mismatch(Dialect::MariaDb, param)),
    };
    Ok(query)
}

/// Maps a MariaDB type name to its decoder, `None` when unsupported.
fn class_of(sql_type: &str) -> Option<ColumnClass> {
    let class = match sql_type {
        "BOOLEAN" => ColumnClass::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnClass::Int8,
        t if t.ends_with(" UNSIGNED") => ColumnClass::UInt8,
        "FLOAT" => ColumnClass::Float4,
        "DOUBLE" => ColumnClass::Float8,
        "DECIMAL" => ColumnClass::Decimal,
        "JSON" => ColumnClass::Json,
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            ColumnClass::Text
        }
        "DATE" => ColumnClass::Date,
        "TIME" => ColumnClass::Time,
        "DATETIME" => ColumnClass::Timestamp,
        "TIMESTAMP" => ColumnClass::TimestampTz,
        _ => return None,
    };
    Some(class)
}

fn to_json(row: &MySqlRow) -> Result<JsonRow> {
    let mut out = JsonRow::new();
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let sql_type = column.type_info().name();
        let class = class_of(sql_type).ok_or_else(|| unsupported_column(name, sql_type))?;
        let value = match class {
            ColumnClass::Bool => cell::<_, bool>(row, i, name, Value::from)?,
            ColumnClass::Int2 | ColumnClass::Int4 | ColumnClass::Int8 => {
                cell::<_, i64>(row, i, name, Value::from)?
            }
            ColumnClass::UInt8 => cell::<_, u64>(row, i, name, Value::from)?,
            ColumnClass::Float4 => cell::<_, f32>(row, i, name, Value::from)?,
            ColumnClass::Float8 => cell::<_, f64>(row, i, name, Value::from)?,
            ColumnClass::Decimal => cell::<_, Decimal>(row, i, name, text)?,
            ColumnClass::Json => cell::<_, JsonValue>(row, i, name, identity)?,
            ColumnClass::Uuid | ColumnClass::Text => {
                cell::<_, String>(row, i, name, Value::String)?
            }
            ColumnClass::Date => cell::<_, NaiveDate>(row, i, name, text)?,
            ColumnClass::Time => cell::<_, NaiveTime>(row, i, name, text)?,
            ColumnClass::Timestamp => cell::<_, NaiveDateTime>(row, i, name, text)?,
            ColumnClass::TimestampTz => {
                cell::<_, DateTime<Utc>>(row, i, name, |t| Value::String(t.to_rfc3339()))?
            }
        };
        out.insert(String::from(name), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polycrud_core::TypeDescriptor;

    fn param(kind: TypeKind, value: ParamValue) -> TypedParam {
        TypedParam {
            name: String::from("Field"),
            descriptor: TypeDescriptor::default_for(Dialect::MariaDb, kind, Some(36)),
            value,
        }
    }

    #[test]
    fn test_identifier_binds_as_text() {
        let query = sqlx::query("DELETE FROM Test WHERE ID = ?;");
        let value = ParamValue::Text(String::from("u3"));
        assert!(bind(query, &param(TypeKind::Identifier, value)).is_ok());
    }

    #[test]
    fn test_null_binds_for_every_kind() {
        for kind in [
            TypeKind::Identifier,
            TypeKind::BoundedText,
            TypeKind::UnboundedText,
            TypeKind::Boolean,
            TypeKind::Integer,
            TypeKind::Float,
        ] {
            let query = sqlx::query("UPDATE Test SET Field = ? WHERE ID = ?;");
            assert!(bind(query, &param(kind, ParamValue::Null)).is_ok(), "{kind:?}");
        }
    }

    #[test]
    fn test_column_classes() {
        assert_eq!(class_of("DECIMAL"), Some(ColumnClass::Decimal));
        assert_eq!(class_of("JSON"), Some(ColumnClass::Json));
        assert_eq!(class_of("BIGINT UNSIGNED"), Some(ColumnClass::UInt8));
        assert_eq!(class_of("ENUM"), Some(ColumnClass::Text));
        assert_eq!(class_of("BLOB"), None);
        assert_eq!(class_of("GEOMETRY"), None);
    }

    #[test]
    fn test_uncoerced_value_rejected() {
        let query = sqlx::query("SELECT * FROM Test WHERE Field = ?");
        let result = bind(query, &param(TypeKind::Integer, ParamValue::Bool(true)));
        assert!(result.is_err());
    }
}
