//! Parameter shape validation.
//!
//! Runs before any SQL is built or any connection is requested.

use crate::error::{CrudError, Result};
use crate::operation::Operation;
use crate::params::{ParamSet, IDENTITY_KEY};

/// Checks that `params` has the shape `operation` requires.
///
/// `None` stands for a request that carried no parameter object at all.
pub fn validate(operation: Operation, params: Option<&ParamSet>) -> Result<()> {
    let ok = match operation {
        Operation::Create => params.is_some_and(|p| !p.is_empty()),
        Operation::Read => true,
        Operation::Update => params.is_some_and(|p| has_identity(p) && p.len() > 1),
        Operation::Delete => params.is_some_and(has_identity),
    };

    if ok {
        Ok(())
    } else {
        Err(shape_error(operation))
    }
}

/// Returns the validation error for a parameter object of the wrong shape.
#[must_use]
pub fn shape_error(operation: Operation) -> CrudError {
    let hint = match operation {
        Operation::Create => "Please provide a non-empty object with necessary fields.",
        Operation::Read => "Please provide an object of column values to match.",
        Operation::Update => {
            "Please provide an object with \"ID\" field and at least one other field to update."
        }
        Operation::Delete => "Please provide an object with \"ID\" field.",
    };
    CrudError::Validation(format!(
        "Missing or invalid parameters for {operation} operation. {hint}"
    ))
}

/// Checks that `name` is a plain, optionally schema-qualified SQL identifier.
///
/// Table and column names are spliced into the statement text, so nothing
/// but letters, digits and underscores is let through.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut parts = name.split('.');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(table), None, None) => is_identifier(table),
        (Some(schema), Some(table), None) => is_identifier(schema) && is_identifier(table),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(CrudError::Validation(format!("Invalid identifier: '{name}'")))
    }
}

fn has_identity(params: &ParamSet) -> bool {
    params.get(IDENTITY_KEY).is_some_and(|v| !v.is_null())
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
