//! The end-to-end request pipeline.

use std::sync::Arc;

use polycrud_core::{
    normalize, Dialect, ExecutionResult, Operation, ParamSet, QueryPlan, Result, TypeCatalog,
    IDENTITY_KEY,
};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::executor::execute;
use crate::provider::ConnectionProvider;

/// Turns `{table, operation, params}` requests into executed statements.
///
/// Everything up to and including parameter resolution runs before a
/// connection is requested, so rejected requests never touch the database.
#[derive(Clone)]
pub struct Pipeline {
    dialect: Dialect,
    catalog: Arc<TypeCatalog>,
    config: Arc<ConnectionConfig>,
    provider: Arc<dyn ConnectionProvider>,
}

impl Pipeline {
    /// Creates a pipeline for one dialect.
    pub fn new(
        dialect: Dialect,
        catalog: TypeCatalog,
        config: ConnectionConfig,
        provider: Arc<dyn ConnectionProvider>,
    ) -> Self {
        Self {
            dialect,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
            provider,
        }
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the type catalog.
    #[must_use]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Builds the plan for a request without executing it.
    pub fn plan(
        &self,
        table: &str,
        operation: &str,
        params: Option<&ParamSet>,
    ) -> Result<QueryPlan> {
        let operation: Operation = operation.parse()?;
        let plan = QueryPlan::prepare(self.dialect, table, operation, params, &self.catalog)?;

        if operation == Operation::Delete {
            let ignored: Vec<&str> = params
                .into_iter()
                .flat_map(ParamSet::keys)
                .filter(|k| *k != IDENTITY_KEY)
                .collect();
            if !ignored.is_empty() {
                debug!(table = %table, fields = ?ignored, "Ignoring non-identity fields on DELETE");
            }
        }

        Ok(plan)
    }

    /// Handles one request.
    pub async fn handle(
        &self,
        table: &str,
        operation: &str,
        params: Option<&ParamSet>,
    ) -> Result<ExecutionResult> {
        info!(table = %table, operation = %operation, dialect = %self.dialect, "Handling request");

        let plan = self.plan(table, operation, params)?;
        let conn = self.provider.connect(self.dialect, &self.config).await?;
        let raw = execute(conn, &plan).await?;
        Ok(normalize(plan.operation(), raw))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("dialect", &self.dialect)
            .field("host", &self.config.host)
            .finish_non_exhaustive()
    }
}
