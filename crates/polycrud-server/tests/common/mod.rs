#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use polycrud_core::{CrudError, Dialect, RawResult, Result, TypeCatalog};
use polycrud_exec::{
    BoundStatement, BoxFuture, Connection, ConnectionConfig, ConnectionProvider, Pipeline,
};
use polycrud_server::http::{Method, Request, Response};

/// Backend that answers every statement with the same result.
pub struct StubBackend {
    pub reply: std::result::Result<RawResult, String>,
    pub connects: AtomicUsize,
}

struct StubConnection {
    dialect: Dialect,
    reply: std::result::Result<RawResult, String>,
}

impl Connection for StubConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn execute(&mut self, _statement: BoundStatement) -> BoxFuture<'_, Result<RawResult>> {
        let reply = self.reply.clone().map_err(CrudError::Driver);
        Box::pin(async move { reply })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async { Ok(()) })
    }
}

impl ConnectionProvider for StubBackend {
    fn connect<'a>(
        &'a self,
        dialect: Dialect,
        _config: &'a ConnectionConfig,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>> {
        Box::pin(async move {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubConnection {
                dialect,
                reply: self.reply.clone(),
            }) as Box<dyn Connection>)
        })
    }
}

pub fn backend(reply: std::result::Result<RawResult, String>) -> Arc<StubBackend> {
    Arc::new(StubBackend {
        reply,
        connects: AtomicUsize::new(0),
    })
}

pub fn pipeline(dialect: Dialect, backend: &Arc<StubBackend>) -> Pipeline {
    Pipeline::new(
        dialect,
        TypeCatalog::new(),
        ConnectionConfig::new("db.local"),
        Arc::clone(backend) as Arc<dyn ConnectionProvider>,
    )
}

pub fn post(body: &str) -> Request {
    Request::new(Method::Post, "/api/query")
        .header("Content-Type", "application/json")
        .body(body.as_bytes().to_vec())
}

pub fn body(res: &Response) -> serde_json::Value {
    res.json_body()
        .unwrap_or_else(|e| panic!("Response body is not JSON: {e}"))
}
