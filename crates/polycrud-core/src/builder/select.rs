//! SELECT statements for READ.

use super::Placeholders;
use crate::error::Result;
use crate::params::{is_control_key, ParamSet};
use crate::validate::validate_identifier;

/// Builds `SELECT * FROM <table>` with one equality condition per field.
///
/// Control keys such as `partialMatch` never become conditions. READ
/// statements carry no terminator.
pub(super) fn build(
    table: &str,
    params: &ParamSet,
    placeholders: &mut Placeholders,
) -> Result<String> {
    let mut sql = format!("SELECT * FROM {table}");

    let mut conditions = Vec::new();
    for key in params.keys().filter(|k| !is_control_key(k)) {
        validate_identifier(key)?;
        conditions.push(format!("{key} = {}", placeholders.next(key)));
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    Ok(sql)
}
