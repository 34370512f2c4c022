//! SQL dialect support.
//!
//! Each backend spells bind placeholders differently and rejects some
//! statement shapes. This module captures those differences so the builder
//! and the executor never branch on backend names themselves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CrudError;
use crate::operation::Operation;

/// The relational backends a request can be executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dialect {
    /// Microsoft SQL Server.
    Mssql,
    /// Oracle Database.
    Oracle,
    /// MariaDB / MySQL.
    #[serde(rename = "MARIADB")]
    MariaDb,
    /// PostgreSQL.
    Postgres,
}

/// How placeholders are written and bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// A prefix followed by the field name, e.g. `@Name` or `:Name`.
    Named(char),
    /// A bare `?`, bound by position.
    Anonymous,
    /// `$1`, `$2`, ... bound by position.
    Numbered,
}

impl PlaceholderStyle {
    /// Returns whether values are attached by name.
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Self::Named(_))
    }
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Self; 4] = [Self::Mssql, Self::Oracle, Self::MariaDb, Self::Postgres];

    /// Returns the configuration name of the dialect.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mssql => "MSSQL",
            Self::Oracle => "ORACLE",
            Self::MariaDb => "MARIADB",
            Self::Postgres => "POSTGRES",
        }
    }

    /// Returns the placeholder style.
    #[must_use]
    pub const fn placeholder_style(self) -> PlaceholderStyle {
        match self {
            Self::Mssql => PlaceholderStyle::Named('@'),
            Self::Oracle => PlaceholderStyle::Named(':'),
            Self::MariaDb => PlaceholderStyle::Anonymous,
            Self::Postgres => PlaceholderStyle::Numbered,
        }
    }

    /// Returns the terminator appended to data-modifying statements.
    ///
    /// OCI rejects a trailing semicolon, so Oracle gets none.
    #[must_use]
    pub const fn statement_terminator(self) -> &'static str {
        match self {
            Self::Oracle => "",
            Self::Mssql | Self::MariaDb | Self::Postgres => ";",
        }
    }

    /// Returns whether the operation can be built for this dialect.
    #[must_use]
    pub const fn supports(self, operation: Operation) -> bool {
        !matches!(
            (self, operation),
            (Self::Oracle, Operation::Create | Operation::Delete)
        )
    }

    /// Returns the port used when the configuration does not name one.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Mssql => 1433,
            Self::Oracle => 1521,
            Self::MariaDb => 3306,
            Self::Postgres => 5432,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MSSQL" => Ok(Self::Mssql),
            "ORACLE" => Ok(Self::Oracle),
            "MARIADB" => Ok(Self::MariaDb),
            "POSTGRES" => Ok(Self::Postgres),
            _ => Err(CrudError::UnsupportedDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialect() {
        assert_eq!("mssql".parse::<Dialect>().unwrap(), Dialect::Mssql);
        assert_eq!("MariaDB".parse::<Dialect>().unwrap(), Dialect::MariaDb);
        assert_eq!(" POSTGRES ".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!(matches!(
            "sqlite".parse::<Dialect>(),
            Err(CrudError::UnsupportedDialect(name)) if name == "sqlite"
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_oracle_restrictions() {
        assert!(!Dialect::Oracle.supports(Operation::Create));
        assert!(!Dialect::Oracle.supports(Operation::Delete));
        assert!(Dialect::Oracle.supports(Operation::Read));
        assert!(Dialect::Oracle.supports(Operation::Update));
        assert!(Dialect::Mssql.supports(Operation::Create));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Dialect::MariaDb).unwrap();
        assert_eq!(json, "\"MARIADB\"");
        let parsed: Dialect = serde_json::from_str("\"POSTGRES\"").unwrap();
        assert_eq!(parsed, Dialect::Postgres);
    }
}
