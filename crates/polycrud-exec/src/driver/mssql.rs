//! SQL Server connection.
//!
//! tiberius only understands positional `@P1..@Pn` parameters, so every
//! statement is sent as a batch that first declares each `@name` variable
//! with its bind type and assigns it from its positional parameter.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures::future::BoxFuture;
use polycrud_core::{
    CrudError, Dialect, ParamValue, RawResult, Result, Row as JsonRow, TypeDescriptor, TypeKind,
    TypedParam,
};
use serde_json::Value;
use tiberius::{
    AuthMethod, Client, ColumnData, ColumnType, Config, EncryptionLevel, FromSql, Query, Row,
    Uuid,
};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use super::{bind_mismatch, text, unsupported_column};
use crate::config::ConnectionConfig;
use crate::connection::{BoundStatement, Connection};
use crate::error::mssql_error;

/// A single, unpooled SQL Server connection.
pub struct MssqlConnection {
    client: Client<Compat<TcpStream>>,
}

impl MssqlConnection {
    /// Opens a connection.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let tds = tds_config(config);
        let tcp = TcpStream::connect(tds.get_addr())
            .await
            .map_err(|e| CrudError::Connection(e.to_string()))?;
        tcp.set_nodelay(true)
            .map_err(|e| CrudError::Connection(e.to_string()))?;

        let client = Client::connect(tds, tcp.compat_write())
            .await
            .map_err(|e| CrudError::Connection(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Connection for MssqlConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Mssql
    }

    fn execute(&mut self, statement: BoundStatement) -> BoxFuture<'_, Result<RawResult>> {
        Box::pin(async move {
            let mut query = Query::new(batch(&statement));
            for param in statement.binds.params() {
                bind(&mut query, param)?;
            }

            if statement.returns_rows() {
                let rows = query
                    .query(&mut self.client)
                    .await
                    .map_err(mssql_error)?
                    .into_first_result()
                    .await
                    .map_err(mssql_error)?;
                Ok(RawResult::Mssql {
                    recordset: Some(rows.into_iter().map(to_json).collect::<Result<_>>()?),
                    rows_affected: Vec::new(),
                })
            } else {
                let done = query.execute(&mut self.client).await.map_err(mssql_error)?;
                Ok(RawResult::Mssql {
                    recordset: None,
                    rows_affected: done.rows_affected().to_vec(),
                })
            }
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move { self.client.close().await.map_err(mssql_error) })
    }
}

fn tds_config(config: &ConnectionConfig) -> Config {
    let mut tds = Config::new();
    tds.host(&config.host);
    tds.port(config.port_for(Dialect::Mssql));
    tds.authentication(AuthMethod::sql_server(&config.user, &config.password));
    if !config.database.is_empty() {
        tds.database(&config.database);
    }
    tds.encryption(if config.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::NotSupported
    });
    if config.trust_server_certificate {
        tds.trust_cert();
    }
    tds
}

/// Prefixes the statement with one `DECLARE` per named binding.
fn batch(statement: &BoundStatement) -> String {
    let mut sql = String::new();
    for (i, param) in statement.binds.params().enumerate() {
        sql.push_str(&format!(
            "DECLARE @{} {} = @P{};\n",
            param.name,
            declared_type(&param.descriptor),
            i + 1
        ));
    }
    sql.push_str(&statement.sql);
    sql
}

/// Local variables cannot be `Text` or `NText`.
fn declared_type(descriptor: &TypeDescriptor) -> String {
    let native = descriptor.native.to_ascii_lowercase();
    if matches!(native.as_str(), "text" | "ntext") {
        String::from("NVarChar(max)")
    } else {
        descriptor.to_string()
    }
}

fn bind(query: &mut Query<'_>, param: &TypedParam) -> Result<()> {
    match (param.descriptor.kind, &param.value) {
        (TypeKind::Identifier, ParamValue::Null) => query.bind(None::<Uuid>),
        (TypeKind::Identifier, ParamValue::Text(s)) => match Uuid::parse_str(s) {
            Ok(id) => query.bind(id),
            Err(_) => query.bind(s.clone()),
        },
        (TypeKind::BoundedText | TypeKind::UnboundedText, ParamValue::Null) => {
            query.bind(None::<String>);
        }
        (TypeKind::BoundedText | TypeKind::UnboundedText, ParamValue::Text(s)) => {
            query.bind(s.clone());
        }
        (TypeKind::Boolean, ParamValue::Null) => query.bind(None::<bool>),
        (TypeKind::Boolean, ParamValue::Bool(b)) => query.bind(*b),
        (TypeKind::Integer, ParamValue::Null) => query.bind(None::<i64>),
        (TypeKind::Integer, ParamValue::Int(n)) => query.bind(*n),
        (TypeKind::Float, ParamValue::Null) => query.bind(None::<f64>),
        (TypeKind::Float, ParamValue::Float(f)) => query.bind(*f),
        _ => return Err(bind_mismatch(Dialect::Mssql, param)),
    }
    Ok(())
}

fn to_json(row: Row) -> Result<JsonRow> {
    let columns: Vec<(String, ColumnType)> = row
        .columns()
        .iter()
        .map(|c| (String::from(c.name()), c.column_type()))
        .collect();

    let mut out = JsonRow::new();
    for ((name, column_type), data) in columns.into_iter().zip(row) {
        let value = cell(&name, column_type, &data)?;
        out.insert(name, value);
    }
    Ok(out)
}

fn cell(column: &str, column_type: ColumnType, data: &ColumnData<'static>) -> Result<Value> {
    let value = match data {
        ColumnData::U8(v) => v.map(Value::from),
        ColumnData::I16(v) => v.map(Value::from),
        ColumnData::I32(v) => v.map(Value::from),
        ColumnData::I64(v) => v.map(Value::from),
        ColumnData::F32(v) => v.map(Value::from),
        ColumnData::F64(v) => v.map(Value::from),
        ColumnData::Bit(v) => v.map(Value::from),
        ColumnData::String(v) => v.as_deref().map(|s| Value::String(String::from(s))),
        ColumnData::Guid(v) => v.as_ref().map(text),
        ColumnData::Numeric(v) => v.as_ref().map(text),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            decode::<NaiveDateTime>(column, data)?.map(text)
        }
        ColumnData::Date(_) => decode::<NaiveDate>(column, data)?.map(text),
        ColumnData::Time(_) => decode::<NaiveTime>(column, data)?.map(text),
        ColumnData::DateTimeOffset(_) => decode::<DateTime<FixedOffset>>(column, data)?
            .map(|t| Value::String(t.to_rfc3339())),
        _ => return Err(unsupported_column(column, &format!("{column_type:?}"))),
    };
    Ok(value.unwrap_or(Value::Null))
}

fn decode<'a, T: FromSql<'a>>(column: &str, data: &'a ColumnData<'static>) -> Result<Option<T>> {
    T::from_sql(data)
        .map_err(|err| CrudError::Driver(format!("cannot decode column '{column}': {err}")))
}
