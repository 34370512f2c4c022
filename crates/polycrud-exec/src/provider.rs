//! Connection acquisition.

use futures::future::BoxFuture;
use polycrud_core::{CrudError, Dialect, Result};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::driver::{MariaDbConnection, MssqlConnection, OracleConnection, PostgresConnection};

/// Hands out connections for a dialect.
///
/// Embedders supply their own provider to hand out pooled connections.
pub trait ConnectionProvider: Send + Sync {
    /// Opens or checks out a connection.
    fn connect<'a>(
        &'a self,
        dialect: Dialect,
        config: &'a ConnectionConfig,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>>;
}

/// Opens a fresh native connection per request.
///
/// MSSQL goes through tiberius, ORACLE through the `oracle` crate, MARIADB
/// and POSTGRES through sqlx.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverConnector;

impl DriverConnector {
    /// Creates a new connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn open(dialect: Dialect, config: &ConnectionConfig) -> Result<Box<dyn Connection>> {
        debug!(
            dialect = %dialect,
            host = %config.host,
            port = config.port_for(dialect),
            "Opening connection"
        );
        match dialect {
            Dialect::Postgres => {
                let conn = PostgresConnection::connect(config).await?;
                Ok(Box::new(conn) as Box<dyn Connection>)
            }
            Dialect::MariaDb => {
                let conn = MariaDbConnection::connect(config).await?;
                Ok(Box::new(conn) as Box<dyn Connection>)
            }
            Dialect::Mssql => {
                let conn = MssqlConnection::connect(config).await?;
                Ok(Box::new(conn) as Box<dyn Connection>)
            }
            Dialect::Oracle => {
                let conn = OracleConnection::connect(config).await?;
                Ok(Box::new(conn) as Box<dyn Connection>)
            }
        }
    }
}

impl ConnectionProvider for DriverConnector {
    fn connect<'a>(
        &'a self,
        dialect: Dialect,
        config: &'a ConnectionConfig,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>> {
        Box::pin(async move {
            tokio::time::timeout(config.connect_timeout, Self::open(dialect, config))
                .await
                .map_err(|_| {
                    CrudError::Connection(format!(
                        "timed out after {}s connecting to {dialect} at {}",
                        config.connect_timeout.as_secs(),
                        config.host
                    ))
                })?
        })
    }
}
