//! Parameter resolution.
//!
//! Gives every request field a dialect-native bind type, lower-cases login
//! names and coerces values to the chosen type.

use uuid::Uuid;

use crate::catalog::{TypeCatalog, TypeDescriptor, TypeKind};
use crate::dialect::Dialect;
use crate::error::{CrudError, Result};
use crate::params::{is_control_key, ParamSet, ParamValue};

/// A field resolved to its bind type and normalized value.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedParam {
    /// Field name.
    pub name: String,
    /// Native bind type.
    pub descriptor: TypeDescriptor,
    /// Normalized value, coerced to `descriptor.kind`.
    pub value: ParamValue,
}

/// Resolves every field of `params` in insertion order.
///
/// Control keys are skipped since no placeholder ever refers to them.
pub fn resolve(
    dialect: Dialect,
    params: &ParamSet,
    catalog: &TypeCatalog,
) -> Result<Vec<TypedParam>> {
    params
        .iter()
        .filter(|(name, _)| !is_control_key(name))
        .map(|(name, value)| resolve_one(dialect, name, value, catalog))
        .collect()
}

fn resolve_one(
    dialect: Dialect,
    name: &str,
    value: &ParamValue,
    catalog: &TypeCatalog,
) -> Result<TypedParam> {
    let value = match value {
        ParamValue::Text(s) if catalog.lowercases(name) => ParamValue::Text(s.to_lowercase()),
        other => other.clone(),
    };
    let descriptor = catalog.descriptor_for(dialect, name, &value)?;
    let value = coerce(&descriptor, name, value)?;

    Ok(TypedParam {
        name: String::from(name),
        descriptor,
        value,
    })
}

/// Converts `value` to the representation `descriptor.kind` binds with.
fn coerce(descriptor: &TypeDescriptor, field: &str, value: ParamValue) -> Result<ParamValue> {
    let mismatch = |value: &ParamValue| CrudError::UnsupportedType {
        dialect: descriptor.dialect,
        field: String::from(field),
        message: format!("cannot bind {} value as {descriptor}", value.type_name()),
    };

    let coerced = match (descriptor.kind, value) {
        (_, ParamValue::Null) => ParamValue::Null,

        (TypeKind::Identifier | TypeKind::BoundedText | TypeKind::UnboundedText, v) => match v {
            ParamValue::Text(s) => ParamValue::Text(s),
            ParamValue::Int(n) => ParamValue::Text(n.to_string()),
            ParamValue::Float(f) => ParamValue::Text(f.to_string()),
            ParamValue::Bool(b) if descriptor.kind != TypeKind::Identifier => {
                ParamValue::Text(b.to_string())
            }
            other => return Err(mismatch(&other)),
        },

        (TypeKind::Integer, v) => match v {
            ParamValue::Int(n) => ParamValue::Int(n),
            ParamValue::Bool(b) => ParamValue::Int(i64::from(b)),
            ParamValue::Text(ref s) => match s.trim().parse::<i64>() {
                Ok(n) => ParamValue::Int(n),
                Err(_) => return Err(mismatch(&v)),
            },
            #[allow(clippy::cast_possible_truncation)]
            ParamValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                ParamValue::Int(f as i64)
            }
            other => return Err(mismatch(&other)),
        },

        (TypeKind::Float, v) => match v {
            ParamValue::Float(f) => ParamValue::Float(f),
            #[allow(clippy::cast_precision_loss)]
            ParamValue::Int(n) => ParamValue::Float(n as f64),
            ParamValue::Text(ref s) => match s.trim().parse::<f64>() {
                Ok(f) => ParamValue::Float(f),
                Err(_) => return Err(mismatch(&v)),
            },
            other => return Err(mismatch(&other)),
        },

        (TypeKind::Boolean, v) => match v {
            ParamValue::Bool(b) => ParamValue::Bool(b),
            ParamValue::Int(0) => ParamValue::Bool(false),
            ParamValue::Int(1) => ParamValue::Bool(true),
            ParamValue::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => ParamValue::Bool(true),
                "false" | "0" => ParamValue::Bool(false),
                _ => return Err(mismatch(&v)),
            },
            other => return Err(mismatch(&other)),
        },
    };

    if let ParamValue::Text(s) = &coerced {
        if descriptor.kind == TypeKind::Identifier && is_native_uuid(descriptor) {
            Uuid::parse_str(s).map_err(|err| CrudError::UnsupportedType {
                dialect: descriptor.dialect,
                field: String::from(field),
                message: format!("'{s}' is not a valid uuid: {err}"),
            })?;
        }
    }

    Ok(coerced)
}

/// Columns of a native `uuid` type only accept well-formed UUIDs.
fn is_native_uuid(descriptor: &TypeDescriptor) -> bool {
    descriptor.native.eq_ignore_ascii_case("uuid")
}
