//! # polycrud-exec
//!
//! Runs [`QueryPlan`](polycrud_core::QueryPlan)s against a live database.
//!
//! - [`Connection`] is the seam every backend implements: one statement in,
//!   the driver's native result shape out.
//! - [`ConnectionProvider`] hands out connections; [`DriverConnector`] opens
//!   tiberius, Oracle and sqlx connections for the four dialects.
//! - [`execute`] binds a plan named or positionally, runs it and closes
//!   unpooled connections.
//! - [`Pipeline`] strings validation, construction, typing, execution and
//!   normalization together for one request.

pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod provider;

pub use config::ConnectionConfig;
pub use connection::{Binds, BoundStatement, Connection};
pub use executor::execute;
pub use futures::future::BoxFuture;
pub use pipeline::Pipeline;
pub use provider::{ConnectionProvider, DriverConnector};
