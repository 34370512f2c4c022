//! Statement execution.

use polycrud_core::{QueryPlan, RawResult, Result};
use tracing::{debug, warn};

use crate::connection::{BoundStatement, Connection};

/// Runs `plan` as a single statement on `conn`.
///
/// Unpooled connections are closed afterwards whether or not the statement
/// succeeded. A failed close is logged and never replaces the statement's
/// outcome.
pub async fn execute(mut conn: Box<dyn Connection>, plan: &QueryPlan) -> Result<RawResult> {
    let statement = BoundStatement::from_plan(plan);
    debug!(
        dialect = %plan.dialect(),
        sql = %statement.sql,
        binds = statement.binds.len(),
        "Executing statement"
    );

    let outcome = conn.execute(statement).await;
    if let Err(err) = &outcome {
        warn!(table = %plan.table(), operation = %plan.operation(), error = %err, "Statement failed");
    }

    if !conn.is_pooled() {
        if let Err(err) = conn.close().await {
            warn!(error = %err, "Failed to close connection");
        }
    }

    outcome
}
