//! Dialect-aware CRUD statement builder.
//!
//! Turns a table name, an operation and a [`ParamSet`] into SQL text with
//! one placeholder per value. Values never appear in the text; the returned
//! [`Statement`] lists the field behind every placeholder instead.
//!
//! # Example
//!
//! ```rust
//! use polycrud_core::builder::build;
//! use polycrud_core::{Dialect, Operation, ParamSet};
//!
//! let params = ParamSet::new().with("Name", "x").with("Text", "y").with("ID", "u2");
//! let stmt = build(Dialect::Mssql, "Test", Operation::Update, &params).unwrap();
//!
//! assert_eq!(stmt.sql, "UPDATE Test SET Name = @Name, Text = @Text WHERE ID = @ID;");
//! assert_eq!(stmt.bindings, vec!["Name", "Text", "ID"]);
//! ```

mod delete;
mod insert;
mod placeholder;
mod select;
mod update;

pub use placeholder::Placeholders;

use crate::dialect::Dialect;
use crate::error::{CrudError, Result};
use crate::operation::Operation;
use crate::params::ParamSet;
use crate::validate::validate_identifier;

/// SQL text plus the field name bound at each placeholder, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Parameterized SQL text.
    pub sql: String,
    /// Field names in placeholder order.
    pub bindings: Vec<String>,
}

/// Builds the statement for `operation` on `table`.
///
/// Fails with [`CrudError::UnsupportedOperation`] when the dialect does not
/// implement the operation, and with [`CrudError::Validation`] when the
/// table or a column name is not a plain identifier.
pub fn build(
    dialect: Dialect,
    table: &str,
    operation: Operation,
    params: &ParamSet,
) -> Result<Statement> {
    if !dialect.supports(operation) {
        return Err(CrudError::UnsupportedOperation { operation, dialect });
    }
    validate_identifier(table)?;

    let mut placeholders = Placeholders::new(dialect);
    let sql = match operation {
        Operation::Create => insert::build(dialect, table, params, &mut placeholders)?,
        Operation::Read => select::build(table, params, &mut placeholders)?,
        Operation::Update => update::build(dialect, table, params, &mut placeholders)?,
        Operation::Delete => delete::build(dialect, table, &mut placeholders),
    };

    Ok(Statement {
        sql,
        bindings: placeholders.into_bindings(),
    })
}
