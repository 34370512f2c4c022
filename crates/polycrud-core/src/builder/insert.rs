//! INSERT statements for CREATE.

use super::Placeholders;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::operation::Operation;
use crate::params::{is_control_key, ParamSet};
use crate::validate::{shape_error, validate_identifier};

/// Builds `INSERT INTO <table> (<cols>) VALUES (<placeholders>)`.
///
/// Columns and placeholders both follow the parameter set's order. Control
/// keys are not columns.
pub(super) fn build(
    dialect: Dialect,
    table: &str,
    params: &ParamSet,
    placeholders: &mut Placeholders,
) -> Result<String> {
    let mut columns = Vec::with_capacity(params.len());
    let mut values = Vec::with_capacity(params.len());

    for key in params.keys().filter(|k| !is_control_key(k)) {
        validate_identifier(key)?;
        columns.push(key);
        values.push(placeholders.next(key));
    }
    if columns.is_empty() {
        return Err(shape_error(Operation::Create));
    }

    Ok(format!(
        "INSERT INTO {table} ({}) VALUES ({}){}",
        columns.join(", "),
        values.join(", "),
        dialect.statement_terminator()
    ))
}
