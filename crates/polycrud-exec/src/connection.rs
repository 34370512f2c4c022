//! Connection abstraction shared by every backend.

use futures::future::BoxFuture;
use polycrud_core::{Dialect, Operation, QueryPlan, RawResult, Result, TypedParam};

/// Bound values in the form the dialect's driver expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Binds {
    /// Values addressed by placeholder name, without the prefix character.
    Named(Vec<(String, TypedParam)>),
    /// Values addressed by position, first placeholder first.
    Positional(Vec<TypedParam>),
}

impl Binds {
    /// Returns the number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Named(binds) => binds.len(),
            Self::Positional(binds) => binds.len(),
        }
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the bound parameters in placeholder order.
    pub fn params(&self) -> Box<dyn Iterator<Item = &TypedParam> + '_> {
        match self {
            Self::Named(binds) => Box::new(binds.iter().map(|(_, p)| p)),
            Self::Positional(binds) => Box::new(binds.iter()),
        }
    }
}

/// A single statement ready to hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    /// Operation the statement performs.
    pub operation: Operation,
    /// SQL text.
    pub sql: String,
    /// Values for the placeholders in `sql`.
    pub binds: Binds,
}

impl BoundStatement {
    /// Binds a plan's parameters the way its dialect addresses placeholders.
    #[must_use]
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let params = plan.params().to_vec();
        let binds = if plan.dialect().placeholder_style().is_named() {
            Binds::Named(params.into_iter().map(|p| (p.name.clone(), p)).collect())
        } else {
            Binds::Positional(params)
        };

        Self {
            operation: plan.operation(),
            sql: String::from(plan.sql()),
            binds,
        }
    }

    /// Returns true if the statement produces a row set.
    #[must_use]
    pub fn returns_rows(&self) -> bool {
        self.operation == Operation::Read
    }
}

/// An open database connection.
///
/// Implementations run exactly one statement per `execute` call and report
/// the driver's native result shape.
pub trait Connection: Send {
    /// Returns the dialect spoken over this connection.
    fn dialect(&self) -> Dialect;

    /// Executes one statement.
    fn execute(&mut self, statement: BoundStatement) -> BoxFuture<'_, Result<RawResult>>;

    /// Returns true if the connection belongs to a pool that reclaims it.
    fn is_pooled(&self) -> bool {
        false
    }

    /// Closes the connection.
    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}
