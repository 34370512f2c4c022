//! The `/api/query` endpoint.

use polycrud_core::validate::shape_error;
use polycrud_core::{CrudError, Operation, ParamSet};
use polycrud_exec::Pipeline;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::http::{Method, Request, Response};

/// Path of the query endpoint.
pub const QUERY_PATH: &str = "/api/query";

/// Body of a query request.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Target table.
    pub table: String,
    /// CRUD operation name.
    pub operation: String,
    /// Field values; anything but an object or null is rejected.
    #[serde(default)]
    pub params: Option<Value>,
}

/// Routes one request.
pub async fn handle(req: Request, pipeline: &Pipeline) -> Response {
    if req.path != QUERY_PATH {
        return Response::not_found().with_cors();
    }

    match req.method {
        Method::Options => Response::no_content().with_cors(),
        Method::Post => query(&req, pipeline).await.with_cors(),
        Method::Get | Method::Other => Response::method_not_allowed("POST, OPTIONS").with_cors(),
    }
}

async fn query(req: &Request, pipeline: &Pipeline) -> Response {
    let body: QueryRequest = match req.json() {
        Ok(body) => body,
        Err(e) => {
            return error_response(&CrudError::Validation(format!(
                "Invalid request body: {e}"
            )))
        }
    };

    let params = match params_of(&body) {
        Ok(params) => params,
        Err(e) => return error_response(&e),
    };

    match pipeline
        .handle(&body.table, &body.operation, params.as_ref())
        .await
    {
        Ok(result) => Response::json(200, &result),
        Err(e) => error_response(&e),
    }
}

/// Extracts the parameter set, rejecting non-object params with the
/// operation's shape error.
fn params_of(body: &QueryRequest) -> Result<Option<ParamSet>, CrudError> {
    match &body.params {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => ParamSet::deserialize(value)
            .map(Some)
            .map_err(|e| CrudError::Validation(format!("Invalid parameters: {e}"))),
        Some(_) => {
            let operation: Operation = body.operation.parse()?;
            Err(shape_error(operation))
        }
    }
}

/// Maps an error to its HTTP status.
#[must_use]
pub const fn status_for(err: &CrudError) -> u16 {
    match err {
        CrudError::Validation(_)
        | CrudError::UnknownOperation(_)
        | CrudError::UnsupportedOperation { .. }
        | CrudError::UnsupportedType { .. } => 400,
        CrudError::Connection(_) => 502,
        CrudError::ParamConfig { .. } | CrudError::UnsupportedDialect(_) | CrudError::Driver(_) => {
            500
        }
    }
}

fn error_response(err: &CrudError) -> Response {
    let status = status_for(err);
    if status >= 500 {
        error!(kind = err.kind(), error = %err, "Request failed");
    } else {
        warn!(kind = err.kind(), error = %err, "Request rejected");
    }
    Response::json(status, &json!({ "error": err.to_string(), "kind": err.kind() }))
}
