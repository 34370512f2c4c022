//! # polycrud-core
//!
//! Dialect-aware construction of single-table CRUD statements.
//!
//! This crate provides:
//! - A validator that checks the shape of request parameters per operation
//! - A builder emitting parameterized SQL for MSSQL, Oracle, MariaDB and PostgreSQL
//! - A type catalog and resolver assigning each value a dialect-native bind type
//! - A normalizer folding driver results into one canonical shape
//!
//! Nothing here performs I/O; executing a [`QueryPlan`] is the job of
//! `polycrud-exec`.
//!
//! ## Building a plan
//!
//! ```rust
//! use polycrud_core::{Dialect, Operation, ParamSet, QueryPlan, TypeCatalog};
//!
//! let params = ParamSet::new()
//!     .with("Name", "x")
//!     .with("Text", "y")
//!     .with("ID", "0b6f1c9e-3f5e-4a57-9a43-5b0d0f7f2c11");
//! let plan = QueryPlan::prepare(
//!     Dialect::Postgres,
//!     "Test",
//!     Operation::Update,
//!     Some(&params),
//!     &TypeCatalog::new(),
//! )
//! .unwrap();
//!
//! assert_eq!(plan.sql(), "UPDATE Test SET Name = $1, Text = $2 WHERE ID = $3;");
//! assert_eq!(plan.params()[2].descriptor.to_string(), "uuid");
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values only ever travel as bind parameters, and table and column names
//! must be plain identifiers:
//!
//! ```rust
//! use polycrud_core::builder::build;
//! use polycrud_core::{Dialect, Operation, ParamSet};
//!
//! let params = ParamSet::new().with("Name", "'; DROP TABLE users; --");
//! let stmt = build(Dialect::MariaDb, "users", Operation::Read, &params).unwrap();
//! assert_eq!(stmt.sql, "SELECT * FROM users WHERE Name = ?");
//!
//! let bad = build(Dialect::MariaDb, "users; --", Operation::Read, &params);
//! assert!(bad.is_err());
//! ```

pub mod builder;
pub mod catalog;
pub mod dialect;
pub mod error;
pub mod operation;
pub mod params;
pub mod plan;
pub mod resolve;
pub mod result;
pub mod validate;

pub use builder::{build, Statement};
pub use catalog::{TypeCatalog, TypeDescriptor, TypeEntry, TypeKind};
pub use dialect::{Dialect, PlaceholderStyle};
pub use error::{CrudError, Result};
pub use operation::Operation;
pub use params::{ParamSet, ParamValue, ToParamValue, IDENTITY_KEY};
pub use plan::QueryPlan;
pub use resolve::{resolve, TypedParam};
pub use result::{normalize, ExecutionResult, MariaDbOutcome, RawResult, Row};
pub use validate::{validate, validate_identifier};
