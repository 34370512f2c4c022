//! # polycrud-server
//!
//! Serves the query pipeline over HTTP at `POST /api/query`.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;

pub use config::Cli;
pub use error::{Result, ServerError};
pub use handler::{handle, QueryRequest, QUERY_PATH};
