//! Mapping of driver errors into the pipeline's error taxonomy.

use polycrud_core::CrudError;

/// Converts an sqlx error raised while connecting.
pub fn connect_error(err: sqlx::Error) -> CrudError {
    CrudError::Connection(err.to_string())
}

/// Converts an sqlx error raised while running a statement.
///
/// Transport failures surface as connection errors, everything else as
/// driver errors.
pub fn driver_error(err: sqlx::Error) -> CrudError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => CrudError::Connection(err.to_string()),
        sqlx::Error::Database(db) => {
            let message = match db.code() {
                Some(code) => format!("{} (code {code})", db.message()),
                None => db.message().to_string(),
            };
            CrudError::Driver(message)
        }
        other => CrudError::Driver(other.to_string()),
    }
}

/// Converts a tiberius error raised while running a statement.
pub fn mssql_error(err: tiberius::error::Error) -> CrudError {
    match err {
        tiberius::error::Error::Io { .. }
        | tiberius::error::Error::Tls(_)
        | tiberius::error::Error::Routing { .. } => CrudError::Connection(err.to_string()),
        tiberius::error::Error::Server(token) => {
            CrudError::Driver(format!("{} (code {})", token.message(), token.code()))
        }
        other => CrudError::Driver(other.to_string()),
    }
}
