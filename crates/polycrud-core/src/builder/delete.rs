//! DELETE statements.

use super::Placeholders;
use crate::dialect::Dialect;
use crate::params::IDENTITY_KEY;

/// Builds `DELETE FROM <table> WHERE ID = ph`.
///
/// Only the identity key is bound; any other field is ignored.
pub(super) fn build(dialect: Dialect, table: &str, placeholders: &mut Placeholders) -> String {
    let identity = placeholders.next(IDENTITY_KEY);
    format!(
        "DELETE FROM {table} WHERE {IDENTITY_KEY} = {identity}{}",
        dialect.statement_terminator()
    )
}
