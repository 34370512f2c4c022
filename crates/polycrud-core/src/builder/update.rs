//! UPDATE statements.

use super::Placeholders;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::operation::Operation;
use crate::params::{is_control_key, ParamSet, IDENTITY_KEY};
use crate::validate::{shape_error, validate_identifier};

/// Builds `UPDATE <table> SET k = ph, ... WHERE ID = ph`.
///
/// The identity key is left out of the SET clause wherever it appears in the
/// parameter set, and its placeholder is allocated after all SET
/// placeholders.
pub(super) fn build(
    dialect: Dialect,
    table: &str,
    params: &ParamSet,
    placeholders: &mut Placeholders,
) -> Result<String> {
    let mut assignments = Vec::with_capacity(params.len());
    for key in params
        .keys()
        .filter(|k| *k != IDENTITY_KEY && !is_control_key(k))
    {
        validate_identifier(key)?;
        assignments.push(format!("{key} = {}", placeholders.next(key)));
    }
    if assignments.is_empty() {
        return Err(shape_error(Operation::Update));
    }

    let identity = placeholders.next(IDENTITY_KEY);

    Ok(format!(
        "UPDATE {table} SET {} WHERE {IDENTITY_KEY} = {identity}{}",
        assignments.join(", "),
        dialect.statement_terminator()
    ))
}
