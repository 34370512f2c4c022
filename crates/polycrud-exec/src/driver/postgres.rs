//! PostgreSQL connection.

use std::convert::identity;

use futures::future::BoxFuture;
use polycrud_core::{
    CrudError, Dialect, ParamValue, RawResult, Result, Row as JsonRow, TypeKind, TypedParam,
};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgRow};
use sqlx::query::Query;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{Decimal, JsonValue};
use sqlx::{Column, Connection as _, PgConnection, Postgres, Row, TypeInfo};
use uuid::Uuid;

use super::{bind_mismatch, cell, text, unsupported_column, ColumnClass};
use crate::config::ConnectionConfig;
use crate::connection::{BoundStatement, Connection};
use crate::error::{connect_error, driver_error};

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// A single, unpooled PostgreSQL connection.
pub struct PostgresConnection {
    conn: PgConnection,
}

impl PostgresConnection {
    /// Opens a connection.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port_for(Dialect::Postgres))
            .username(&config.user)
            .password(&config.password);
        if !config.database.is_empty() {
            options = options.database(&config.database);
        }

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(connect_error)?;
        Ok(Self { conn })
    }
}

impl Connection for PostgresConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn execute(&mut self, statement: BoundStatement) -> BoxFuture<'_, Result<RawResult>> {
        Box::pin(async move {
            let mut query = sqlx::query(&statement.sql);
            for param in statement.binds.params() {
                query = bind(query, param)?;
            }

            if statement.returns_rows() {
                let rows = query
                    .fetch_all(&mut self.conn)
                    .await
                    .map_err(driver_error)?;
                Ok(RawResult::Postgres {
                    row_count: u64::try_from(rows.len()).ok(),
                    rows: rows.iter().map(to_json).collect::<Result<_>>()?,
                })
            } else {
                let done = query.execute(&mut self.conn).await.map_err(driver_error)?;
                Ok(RawResult::Postgres {
                    rows: Vec::new(),
                    row_count: Some(done.rows_affected()),
                })
            }
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move { self.conn.close().await.map_err(driver_error) })
    }
}

/// Binds one parameter with the Rust type matching its native type.
fn bind<'q>(query: PgQuery<'q>, param: &TypedParam) -> Result<PgQuery<'q>> {
    let native = param.descriptor.native.as_str();
    let query = match (param.descriptor.kind, &param.value) {
        (TypeKind::Identifier, ParamValue::Null) => query.bind(None::<Uuid>),
        (TypeKind::Identifier, ParamValue::Text(s)) => {
            let id = Uuid::parse_str(s).map_err(|e| CrudError::UnsupportedType {
                dialect: Dialect::Postgres,
                field: param.name.clone(),
                message: format!("'{s}' is not a valid uuid: {e}"),
            })?;
            query.bind(id)
        }
        (TypeKind::BoundedText | TypeKind::UnboundedText, ParamValue::Null) => {
            query.bind(None::<String>)
        }
        (TypeKind::BoundedText | TypeKind::UnboundedText, ParamValue::Text(s)) => {
            query.bind(s.clone())
        }
        (TypeKind::Boolean, ParamValue::Null) => query.bind(None::<bool>),
        (TypeKind::Boolean, ParamValue::Bool(b)) => query.bind(*b),
        (TypeKind::Integer, ParamValue::Null) if is_int4(native) => query.bind(None::<i32>),
        (TypeKind::Integer, ParamValue::Null) => query.bind(None::<i64>),
        (TypeKind::Integer, ParamValue::Int(n)) if is_int4(native) => {
            let n = i32::try_from(*n).map_err(|_| bind_mismatch(Dialect::Postgres, param))?;
            query.bind(n)
        }
        (TypeKind::Integer, ParamValue::Int(n)) => query.bind(*n),
        (TypeKind::Float, ParamValue::Null) => query.bind(None::<f64>),
        (TypeKind::Float, ParamValue::Float(f)) => query.bind(*f),
        _ => return Err(bind_mismatch(Dialect::Postgres, param)),
    };
    Ok(query)
}

fn is_int4(native: &str) -> bool {
    matches!(native, "int4" | "integer" | "int" | "serial")
}

/// Maps a PostgreSQL type name to its decoder, `None` when unsupported.
fn class_of(sql_type: &str) -> Option<ColumnClass> {
    let class = match sql_type {
        "BOOL" => ColumnClass::Bool,
        "INT2" => ColumnClass::Int2,
        "INT4" => ColumnClass::Int4,
        "INT8" => ColumnClass::Int8,
        "FLOAT4" => ColumnClass::Float4,
        "FLOAT8" => ColumnClass::Float8,
        "NUMERIC" => ColumnClass::Decimal,
        "JSON" | "JSONB" => ColumnClass::Json,
        "UUID" => ColumnClass::Uuid,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => ColumnClass::Text,
        "DATE" => ColumnClass::Date,
        "TIME" => ColumnClass::Time,
        "TIMESTAMP" => ColumnClass::Timestamp,
        "TIMESTAMPTZ" => ColumnClass::TimestampTz,
        _ => return None,
    };
    Some(class)
}

fn to_json(row: &PgRow) -> Result<JsonRow> {
    let mut out = JsonRow::new();
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let sql_type = column.type_info().name();
        let class = class_of(sql_type).ok_or_else(|| unsupported_column(name, sql_type))?;
        let value = match class {
            ColumnClass::Bool => cell::<_, bool>(row, i, name, Value::from)?,
            ColumnClass::Int2 => cell::<_, i16>(row, i, name, Value::from)?,
            ColumnClass::Int4 => cell::<_, i32>(row, i, name, Value::from)?,
            ColumnClass::Int8 | ColumnClass::UInt8 => cell::<_, i64>(row, i, name, Value::from)?,
            ColumnClass::Float4 => cell::<_, f32>(row, i, name, Value::from)?,
            ColumnClass::Float8 => cell::<_, f64>(row, i, name, Value::from)?,
            ColumnClass::Decimal => cell::<_, Decimal>(row, i, name, text)?,
            ColumnClass::Json => cell::<_, JsonValue>(row, i, name, identity)?,
            ColumnClass::Uuid => cell::<_, Uuid>(row, i, name, text)?,
            ColumnClass::Text => cell::<_, String>(row, i, name, Value::String)?,
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
