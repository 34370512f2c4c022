//! Executable query plans.

use crate::builder::{self, Statement};
use crate::catalog::TypeCatalog;
use crate::dialect::Dialect;
use crate::error::{CrudError, Result};
use crate::operation::Operation;
use crate::params::ParamSet;
use crate::resolve::{resolve, TypedParam};
use crate::validate::validate;

/// A fully built statement with its typed parameters in placeholder order.
///
/// The SQL text contains no values; `params[i]` is bound at the `i`-th
/// placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    dialect: Dialect,
    table: String,
    operation: Operation,
    sql: String,
    params: Vec<TypedParam>,
}

impl QueryPlan {
    /// Pairs a built statement with resolved parameters.
    ///
    /// Every placeholder must have a resolved parameter of the same name.
    pub fn new(
        dialect: Dialect,
        table: &str,
        operation: Operation,
        statement: Statement,
        resolved: Vec<TypedParam>,
    ) -> Result<Self> {
        let mut params = Vec::with_capacity(statement.bindings.len());
        for field in &statement.bindings {
            let param = resolved
                .iter()
                .find(|p| &p.name == field)
                .ok_or_else(|| {
                    CrudError::Validation(format!("No value supplied for field '{field}'"))
                })?;
            params.push(param.clone());
        }

        Ok(Self {
            dialect,
            table: String::from(table),
            operation,
            sql: statement.sql,
            params,
        })
    }

    /// Validates, builds and resolves in one step.
    ///
    /// `params` is `None` when the request carried no parameter object.
    /// Only fields the statement binds are resolved.
    pub fn prepare(
        dialect: Dialect,
        table: &str,
        operation: Operation,
        params: Option<&ParamSet>,
        catalog: &TypeCatalog,
    ) -> Result<Self> {
        validate(operation, params)?;
        let empty = ParamSet::new();
        let params = params.unwrap_or(&empty);
        let statement = builder::build(dialect, table, operation, params)?;
        let bound: ParamSet = params
            .iter()
            .filter(|(name, _)| statement.bindings.iter().any(|b| b == name))
            .map(|(name, value)| (name, value.clone()))
            .collect();
        let resolved = resolve(dialect, &bound, catalog)?;
        Self::new(dialect, table, operation, statement, resolved)
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the operation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the typed parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[TypedParam] {
        &self.params
    }
}
