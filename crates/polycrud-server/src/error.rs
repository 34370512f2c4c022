//! Server startup errors.

use std::path::PathBuf;

use polycrud_core::CrudError;

/// Errors raised while configuring or starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The type catalog file could not be read.
    #[error("Failed to read type catalog '{path}': {source}")]
    CatalogRead {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The type catalog file is not valid JSON for a catalog.
    #[error("Failed to parse type catalog '{path}': {source}")]
    CatalogParse {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The configuration names an unknown dialect or an invalid catalog entry.
    #[error(transparent)]
    Config(#[from] CrudError),

    /// Listener or connection IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server setup.
pub type Result<T> = std::result::Result<T, ServerError>;
