//! Error types for the CRUD pipeline.

use thiserror::Error;

use crate::dialect::Dialect;
use crate::operation::Operation;

/// Errors raised while validating, building, typing or executing a request.
///
/// Every variant is terminal for the request that produced it.
#[derive(Debug, Error)]
pub enum CrudError {
    /// The parameter set does not have the shape the operation requires.
    #[error("{0}")]
    Validation(String),

    /// The operation name is not one of CREATE, READ, UPDATE or DELETE.
    #[error("Unsupported operation: {0}")]
    UnknownOperation(String),

    /// The operation exists but is not implemented for the active dialect.
    #[error("{operation} operation is not supported for {dialect} in this implementation.")]
    UnsupportedOperation {
        /// The rejected operation.
        operation: Operation,
        /// The active dialect.
        dialect: Dialect,
    },

    /// The configured dialect is not recognized.
    #[error("Unsupported database type: {0}")]
    UnsupportedDialect(String),

    /// A type catalog entry is missing a required attribute.
    #[error("Invalid type configuration for {dialect} field '{field}': {message}")]
    ParamConfig {
        /// Dialect whose catalog holds the entry.
        dialect: Dialect,
        /// Field the entry applies to.
        field: String,
        /// What is wrong with the entry.
        message: String,
    },

    /// A value cannot be bound with any type the dialect understands.
    #[error("Unsupported type for {dialect} field '{field}': {message}")]
    UnsupportedType {
        /// Active dialect.
        dialect: Dialect,
        /// Offending field.
        field: String,
        /// Why no bind type applies.
        message: String,
    },

    /// No connection could be acquired.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The database rejected or failed the statement.
    #[error("Database error: {0}")]
    Driver(String),
}

impl CrudError {
    /// Returns a stable tag identifying the error category.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UnknownOperation(_) => "unknown_operation",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::UnsupportedDialect(_) => "unsupported_dialect",
            Self::ParamConfig { .. } => "param_config",
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::Connection(_) => "connection",
            Self::Driver(_) => "driver",
        }
    }

    /// Returns whether the error was caused by the caller's request rather
    /// than by configuration or the database.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UnknownOperation(_)
                | Self::UnsupportedOperation { .. }
                | Self::UnsupportedType { .. }
        )
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, CrudError>;
