//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use polycrud_core::{Dialect, TypeCatalog};
use polycrud_exec::ConnectionConfig;
use tracing::info;

use crate::error::{Result, ServerError};

/// Generic CRUD endpoint over MSSQL, Oracle, MariaDB and PostgreSQL.
#[derive(Debug, Parser)]
#[command(name = "polycrud")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database dialect: MSSQL, ORACLE, MARIADB or POSTGRES.
    #[arg(long, env = "DB_TYPE")]
    pub db_type: String,

    /// Database host.
    #[arg(long, env = "DB_SERVER", default_value = "localhost")]
    pub db_server: String,

    /// Database port (dialect default if not specified).
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// Database user.
    #[arg(long, env = "DB_USER", default_value = "")]
    pub db_user: String,

    /// Database password.
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Database name.
    #[arg(long, env = "DB_DATABASE", default_value = "")]
    pub db_database: String,

    /// Oracle connect descriptor.
    #[arg(long, env = "ORACLE_CONNECTION_STRING")]
    pub oracle_connection_string: Option<String>,

    /// Encrypt MSSQL connections.
    #[arg(long, env = "DB_ENCRYPT", default_value_t = true, action = clap::ArgAction::Set)]
    pub db_encrypt: bool,

    /// Trust self-signed server certificates.
    #[arg(long, env = "DB_TRUST_CERT")]
    pub db_trust_cert: bool,

    /// Seconds allowed for opening a database connection.
    #[arg(long, env = "DB_CONNECT_TIMEOUT", default_value_t = 15)]
    pub connect_timeout: u64,

    /// Path to a JSON type catalog.
    #[arg(long, env = "TYPE_CATALOG")]
    pub type_catalog: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, env = "BIND_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Largest accepted request body, in bytes.
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = 100 * 1024)]
    pub max_body_bytes: usize,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 3100)]
    pub port: u16,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses the configured dialect.
    pub fn dialect(&self) -> Result<Dialect> {
        Ok(self.db_type.parse()?)
    }

    /// Returns the listen address.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Builds the database connection settings.
    #[must_use]
    pub fn connection_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(&self.db_server)
            .credentials(&self.db_user, &self.db_password)
            .database(&self.db_database)
            .encrypt(self.db_encrypt)
            .trust_server_certificate(self.db_trust_cert)
            .connect_timeout(Duration::from_secs(self.connect_timeout));
        if let Some(port) = self.db_port {
            config = config.port(port);
        }
        if let Some(connect_string) = &self.oracle_connection_string {
            config = config.oracle_connect_string(connect_string);
        }
        config
    }

    /// Loads the type catalog, or an empty one when no file is configured.
    pub fn load_catalog(&self) -> Result<TypeCatalog> {
        let Some(path) = &self.type_catalog else {
            return Ok(TypeCatalog::new());
        };

        let json = std::fs::read_to_string(path).map_err(|source| ServerError::CatalogRead {
            path: path.clone(),
            source,
        })?;
        let catalog = TypeCatalog::from_json(&json).map_err(|source| ServerError::CatalogParse {
            path: path.clone(),
            source,
        })?;
        catalog.check()?;

        info!(
            path = %path.display(),
            dialects = catalog.dialects.len(),
            "Loaded type catalog"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["polycrud"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--db-type", "postgres"]);
        assert_eq!(cli.dialect().unwrap(), Dialect::Postgres);
        assert_eq!(cli.port, 3100);

        let config = cli.connection_config();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port_for(Dialect::Postgres), 5432);
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert!(config.encrypt);
        assert_eq!(cli.max_body_bytes, 100 * 1024);
    }

    #[test]
    fn test_connection_overrides() {
        let cli = parse(&[
            "--db-type",
            "MSSQL",
            "--db-server",
            "sql.internal",
            "--db-port",
            "14330",
            "--db-user",
            "app",
            "--db-trust-cert",
            "--db-encrypt",
            "false",
        ]);
        let config = cli.connection_config();
        assert_eq!(config.host, "sql.internal");
        assert_eq!(config.port_for(Dialect::Mssql), 14330);
        assert_eq!(config.user, "app");
        assert!(config.trust_server_certificate);
        assert!(!config.encrypt);
    }

    #[test]
    fn test_unknown_dialect() {
        let cli = parse(&["--db-type", "sqlite"]);
        assert!(matches!(cli.dialect(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_missing_catalog_file() {
        let cli = parse(&["--db-type", "MARIADB", "--type-catalog", "/nonexistent/types.json"]);
        assert!(matches!(
            cli.load_catalog(),
            Err(ServerError::CatalogRead { .. })
        ));
    }

    #[test]
    fn test_no_catalog_is_empty() {
        let cli = parse(&["--db-type", "MARIADB"]);
        assert!(cli.load_catalog().unwrap().dialects.is_empty());
    }
}
