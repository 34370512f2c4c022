//! Dialect type catalog.
//!
//! Maps a field to the bind type a dialect should receive it as. Lookup goes
//! through three tiers, first match wins:
//!
//! 1. an explicit catalog entry for the dialect and field,
//! 2. the field-name rules in [`NAME_RULES`],
//! 3. the runtime type of the value.
//!
//! Explicit entries name the dialect's own type (`NVarChar`, `uuid`,
//! `CLOB`, ...) and are checked against that dialect's vocabulary.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{CrudError, Result};
use crate::params::ParamValue;

/// Dialect-independent bind category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Row identity (UUID / GUID).
    Identifier,
    /// Text with a maximum length.
    BoundedText,
    /// Text without a length limit.
    UnboundedText,
    /// Boolean / bit flag.
    Boolean,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Float,
}

/// Length used for text when nothing more specific is known.
pub const DEFAULT_TEXT_LENGTH: u32 = 255;

/// A dialect-native bind type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Dialect the type belongs to.
    pub dialect: Dialect,
    /// Bind category.
    pub kind: TypeKind,
    /// Native type name without the length suffix.
    pub native: String,
    /// Maximum length, always present for [`TypeKind::BoundedText`].
    pub length: Option<u32>,
}

impl TypeDescriptor {
    /// Returns the dialect's default type for `kind`.
    #[must_use]
    pub fn default_for(dialect: Dialect, kind: TypeKind, length: Option<u32>) -> Self {
        let (native, default_length) = default_native(dialect, kind);
        let length = match kind {
            TypeKind::BoundedText => Some(length.unwrap_or(DEFAULT_TEXT_LENGTH)),
            _ => default_length,
        };
        Self {
            dialect,
            kind,
            native: String::from(native),
            length,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.length {
            Some(len) => write!(f, "{}({len})", self.native),
            None => f.write_str(&self.native),
        }
    }
}

/// A field-name rule of the fallback decision table.
#[derive(Debug, Clone, Copy)]
pub struct NameRule {
    /// Field names the rule applies to (exact, case-sensitive).
    pub fields: &'static [&'static str],
    /// Bind category.
    pub kind: TypeKind,
    /// Length for bounded text.
    pub length: Option<u32>,
}

/// Field-name rules applied when no explicit entry exists.
pub const NAME_RULES: &[NameRule] = &[
    NameRule {
        fields: &["ID"],
        kind: TypeKind::Identifier,
        length: None,
    },
    NameRule {
        fields: &[
            "Name",
            "Description",
            "Building",
            "Owner",
            "Role",
            "Location",
            "Route",
            "Email",
            "DisplayName",
            "Team",
        ],
        kind: TypeKind::BoundedText,
        length: Some(255),
    },
    NameRule {
        fields: &["Username", "AuthenticatedUsername"],
        kind: TypeKind::BoundedText,
        length: Some(50),
    },
    NameRule {
        fields: &["UITheme", "UITHeme"],
        kind: TypeKind::BoundedText,
        length: Some(50),
    },
    NameRule {
        fields: &["Bio", "PasswordHash", "Image", "AvatarURL"],
        kind: TypeKind::UnboundedText,
        length: None,
    },
    NameRule {
        fields: &["SQL_USER"],
        kind: TypeKind::Boolean,
        length: None,
    },
];

/// Fields lower-cased before binding unless the catalog says otherwise.
pub const DEFAULT_LOWERCASE_FIELDS: &[&str] = &["Username", "AuthenticatedUsername"];

/// Native type names each dialect accepts in explicit entries.
const VOCABULARY: &[(Dialect, &str, TypeKind)] = &[
    (Dialect::Mssql, "UniqueIdentifier", TypeKind::Identifier),
    (Dialect::Mssql, "NVarChar", TypeKind::BoundedText),
    (Dialect::Mssql, "VarChar", TypeKind::BoundedText),
    (Dialect::Mssql, "NChar", TypeKind::BoundedText),
    (Dialect::Mssql, "Char", TypeKind::BoundedText),
    (Dialect::Mssql, "Text", TypeKind::UnboundedText),
    (Dialect::Mssql, "NText", TypeKind::UnboundedText),
    (Dialect::Mssql, "Bit", TypeKind::Boolean),
    (Dialect::Mssql, "TinyInt", TypeKind::Integer),
    (Dialect::Mssql, "SmallInt", TypeKind::Integer),
    (Dialect::Mssql, "Int", TypeKind::Integer),
    (Dialect::Mssql, "BigInt", TypeKind::Integer),
    (Dialect::Mssql, "Real", TypeKind::Float),
    (Dialect::Mssql, "Float", TypeKind::Float),
    (Dialect::Mssql, "Decimal", TypeKind::Float),
    (Dialect::Oracle, "RAW", TypeKind::Identifier),
    (Dialect::Oracle, "STRING", TypeKind::BoundedText),
    (Dialect::Oracle, "VARCHAR2", TypeKind::BoundedText),
    (Dialect::Oracle, "NVARCHAR2", TypeKind::BoundedText),
    (Dialect::Oracle, "CHAR", TypeKind::BoundedText),
    (Dialect::Oracle, "CLOB", TypeKind::UnboundedText),
    (Dialect::Oracle, "NCLOB", TypeKind::UnboundedText),
    (Dialect::Oracle, "BOOLEAN", TypeKind::Boolean),
    (Dialect::Oracle, "NUMBER", TypeKind::Integer),
    (Dialect::Oracle, "INTEGER", TypeKind::Integer),
    (Dialect::Oracle, "BINARY_FLOAT", TypeKind::Float),
    (Dialect::Oracle, "BINARY_DOUBLE", TypeKind::Float),
    (Dialect::MariaDb, "uuid", TypeKind::Identifier),
    (Dialect::MariaDb, "char", TypeKind::BoundedText),
    (Dialect::MariaDb, "varchar", TypeKind::BoundedText),
    (Dialect::MariaDb, "string", TypeKind::BoundedText),
    (Dialect::MariaDb, "text", TypeKind::UnboundedText),
    (Dialect::MariaDb, "mediumtext", TypeKind::UnboundedText),
    (Dialect::MariaDb, "longtext", TypeKind::UnboundedText),
    (Dialect::MariaDb, "boolean", TypeKind::Boolean),
    (Dialect::MariaDb, "bool", TypeKind::Boolean),
    (Dialect::MariaDb, "tinyint", TypeKind::Integer),
    (Dialect::MariaDb, "smallint", TypeKind::Integer),
    (Dialect::MariaDb, "int", TypeKind::Integer),
    (Dialect::MariaDb, "integer", TypeKind::Integer),
    (Dialect::MariaDb, "bigint", TypeKind::Integer),
    (Dialect::MariaDb, "float", TypeKind::Float),
    (Dialect::MariaDb, "double", TypeKind::Float),
    (Dialect::MariaDb, "decimal", TypeKind::Float),
    (Dialect::Postgres, "uuid", TypeKind::Identifier),
    (Dialect::Postgres, "varchar", TypeKind::BoundedText),
    (Dialect::Postgres, "character varying", TypeKind::BoundedText),
    (Dialect::Postgres, "char", TypeKind::BoundedText),
    (Dialect::Postgres, "text", TypeKind::UnboundedText),
    (Dialect::Postgres, "boolean", TypeKind::Boolean),
    (Dialect::Postgres, "bool", TypeKind::Boolean),
    (Dialect::Postgres, "int2", TypeKind::Integer),
    (Dialect::Postgres, "smallint", TypeKind::Integer),
    (Dialect::Postgres, "int", TypeKind::Integer),
    (Dialect::Postgres, "int4", TypeKind::Integer),
    (Dialect::Postgres, "integer", TypeKind::Integer),
    (Dialect::Postgres, "int8", TypeKind::Integer),
    (Dialect::Postgres, "bigint", TypeKind::Integer),
    (Dialect::Postgres, "float4", TypeKind::Float),
    (Dialect::Postgres, "real", TypeKind::Float),
    (Dialect::Postgres, "float8", TypeKind::Float),
    (Dialect::Postgres, "double precision", TypeKind::Float),
    (Dialect::Postgres, "numeric", TypeKind::Float),
];

/// Returns the native name (and fixed length, if any) used for `kind`.
const fn default_native(dialect: Dialect, kind: TypeKind) -> (&'static str, Option<u32>) {
    match (dialect, kind) {
        (Dialect::Mssql, TypeKind::Identifier) => ("UniqueIdentifier", None),
        (Dialect::Mssql, TypeKind::BoundedText) => ("NVarChar", None),
        (Dialect::Mssql, TypeKind::UnboundedText) => ("Text", None),
        (Dialect::Mssql, TypeKind::Boolean) => ("Bit", None),
        (Dialect::Mssql, TypeKind::Integer) => ("Int", None),
        (Dialect::Mssql, TypeKind::Float) => ("Float", None),
        (Dialect::Oracle, TypeKind::Identifier | TypeKind::BoundedText) => ("STRING", None),
        (Dialect::Oracle, TypeKind::UnboundedText) => ("CLOB", None),
        (Dialect::Oracle, TypeKind::Boolean) => ("BOOLEAN", None),
        (Dialect::Oracle, TypeKind::Integer) => ("NUMBER", None),
        (Dialect::Oracle, TypeKind::Float) => ("BINARY_DOUBLE", None),
        (Dialect::MariaDb, TypeKind::Identifier) => ("char", Some(36)),
        (Dialect::MariaDb, TypeKind::BoundedText) => ("varchar", None),
        (Dialect::MariaDb, TypeKind::UnboundedText) => ("text", None),
        (Dialect::MariaDb, TypeKind::Boolean) => ("boolean", None),
        (Dialect::MariaDb, TypeKind::Integer) => ("int", None),
        (Dialect::MariaDb, TypeKind::Float) => ("double", None),
        (Dialect::Postgres, TypeKind::Identifier) => ("uuid", None),
        (Dialect::Postgres, TypeKind::BoundedText) => ("varchar", None),
        (Dialect::Postgres, TypeKind::UnboundedText) => ("text", None),
        (Dialect::Postgres, TypeKind::Boolean) => ("boolean", None),
        (Dialect::Postgres, TypeKind::Integer) => ("int4", None),
        (Dialect::Postgres, TypeKind::Float) => ("float8", None),
    }
}

/// An explicit catalog entry as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    /// Dialect-native type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Maximum length; required for bounded text.
    #[serde(default, alias = "size", skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl TypeEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(type_name: impl Into<String>, length: Option<u32>) -> Self {
        Self {
            type_name: type_name.into(),
            length,
        }
    }

    /// Checks the entry against the dialect vocabulary.
    pub fn to_descriptor(&self, dialect: Dialect, field: &str) -> Result<TypeDescriptor> {
        let (native, kind) = VOCABULARY
            .iter()
            .find(|(d, name, _)| *d == dialect && name.eq_ignore_ascii_case(&self.type_name))
            .map(|(_, name, kind)| (*name, *kind))
            .ok_or_else(|| CrudError::UnsupportedType {
                dialect,
                field: String::from(field),
                message: format!("unknown {dialect} type '{}'", self.type_name),
            })?;

        if kind == TypeKind::BoundedText && self.length.is_none() {
            return Err(CrudError::ParamConfig {
                dialect,
                field: String::from(field),
                message: format!("type '{native}' requires a length"),
            });
        }

        Ok(TypeDescriptor {
            dialect,
            kind,
            native: String::from(native),
            length: self.length,
        })
    }
}

/// Per-dialect type configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCatalog {
    /// Explicit entries, keyed by dialect then field name.
    #[serde(default)]
    pub dialects: HashMap<Dialect, HashMap<String, TypeEntry>>,
    /// Fields whose text values are lower-cased before binding.
    #[serde(default = "default_lowercase")]
    pub lowercase: Vec<String>,
}

fn default_lowercase() -> Vec<String> {
    DEFAULT_LOWERCASE_FIELDS
        .iter()
        .map(|s| String::from(*s))
        .collect()
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self {
            dialects: HashMap::new(),
            lowercase: default_lowercase(),
        }
    }
}

impl TypeCatalog {
    /// Creates a catalog with no explicit entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from JSON.
    ///
    /// ```rust
    /// use polycrud_core::{Dialect, TypeCatalog};
    ///
    /// let catalog = TypeCatalog::from_json(
    ///     r#"{"dialects": {"MSSQL": {"Code": {"type": "NVarChar", "length": 12}}}}"#,
    /// )
    /// .unwrap();
    /// assert!(catalog.entry(Dialect::Mssql, "Code").is_some());
    /// ```
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Adds an explicit entry.
    #[must_use]
    pub fn with_entry(mut self, dialect: Dialect, field: &str, entry: TypeEntry) -> Self {
        self.dialects
            .entry(dialect)
            .or_default()
            .insert(String::from(field), entry);
        self
    }

    /// Returns the explicit entry for a field.
    #[must_use]
    pub fn entry(&self, dialect: Dialect, field: &str) -> Option<&TypeEntry> {
        self.dialects.get(&dialect).and_then(|m| m.get(field))
    }

    /// Returns whether a field is lower-cased before binding.
    #[must_use]
    pub fn lowercases(&self, field: &str) -> bool {
        self.lowercase.iter().any(|f| f == field)
    }

    /// Checks every explicit entry against its dialect's vocabulary.
    pub fn check(&self) -> Result<()> {
        for (dialect, entries) in &self.dialects {
            for (field, entry) in entries {
                entry.to_descriptor(*dialect, field)?;
            }
        }
        Ok(())
    }

    /// Determines the bind type for a field.
    pub fn descriptor_for(
        &self,
        dialect: Dialect,
        field: &str,
        value: &ParamValue,
    ) -> Result<TypeDescriptor> {
        if let Some(entry) = self.entry(dialect, field) {
            return entry.to_descriptor(dialect, field);
        }

        if let Some(rule) = NAME_RULES.iter().find(|r| r.fields.contains(&field)) {
            return Ok(TypeDescriptor::default_for(dialect, rule.kind, rule.length));
        }

        let kind = match value {
            ParamValue::Text(_) => TypeKind::BoundedText,
            ParamValue::Int(_) => TypeKind::Integer,
            ParamValue::Float(_) => TypeKind::Float,
            ParamValue::Bool(_) => TypeKind::Boolean,
            ParamValue::Null => {
                return Err(CrudError::UnsupportedType {
                    dialect,
                    field: String::from(field),
                    message: String::from(
                        "cannot infer a type from null without a catalog entry",
                    ),
                })
            }
        };
        Ok(TypeDescriptor::default_for(dialect, kind, None))
    }
}
