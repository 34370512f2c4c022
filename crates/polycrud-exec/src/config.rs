//! Connection settings.

use std::time::Duration;

use polycrud_core::Dialect;
use serde::{Deserialize, Serialize};

/// Default time allowed for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where and how to reach the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Server host name.
    pub host: String,
    /// Server port; the dialect's default when `None`.
    pub port: Option<u16>,
    /// Login user.
    pub user: String,
    /// Login password.
    #[serde(skip_serializing)]
    pub password: String,
    /// Database (or schema) name.
    pub database: String,
    /// Oracle connect descriptor, e.g. `host:1521/service`.
    pub oracle_connect_string: Option<String>,
    /// Encrypt the connection (MSSQL).
    pub encrypt: bool,
    /// Accept self-signed server certificates (MSSQL).
    pub trust_server_certificate: bool,
    /// Time allowed for establishing a connection.
    #[serde(with = "secs")]
    pub connect_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: None,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            oracle_connect_string: None,
            encrypt: true,
            trust_server_certificate: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Creates a configuration for `host` with every other setting defaulted.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Sets the database name.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Sets the Oracle connect descriptor.
    #[must_use]
    pub fn oracle_connect_string(mut self, connect_string: impl Into<String>) -> Self {
        self.oracle_connect_string = Some(connect_string.into());
        self
    }

    /// Turns TLS on or off for MSSQL connections.
    #[must_use]
    pub const fn encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Accepts self-signed server certificates.
    #[must_use]
    pub const fn trust_server_certificate(mut self, trust: bool) -> Self {
        self.trust_server_certificate = trust;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the port to use for `dialect`.
    #[must_use]
    pub fn port_for(&self, dialect: Dialect) -> u16 {
        self.port.unwrap_or_else(|| dialect.default_port())
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
