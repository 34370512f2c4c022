#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use polycrud_core::{CrudError, Dialect, RawResult, Result};
use polycrud_exec::{BoundStatement, BoxFuture, Connection, ConnectionConfig, ConnectionProvider};

/// What a [`MockConnection`] saw.
#[derive(Debug, Default)]
pub struct Journal {
    pub statements: Mutex<Vec<BoundStatement>>,
    pub closed: AtomicUsize,
    pub connects: AtomicUsize,
}

impl Journal {
    pub fn statements(&self) -> Vec<BoundStatement> {
        self.statements.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

/// Canned reply for the next statement.
#[derive(Debug, Clone)]
pub enum Reply {
    Result(RawResult),
    Fail(String),
}

pub struct MockConnection {
    pub dialect: Dialect,
    pub reply: Reply,
    pub pooled: bool,
    pub fail_close: bool,
    pub journal: Arc<Journal>,
}

impl Connection for MockConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn execute(&mut self, statement: BoundStatement) -> BoxFuture<'_, Result<RawResult>> {
        Box::pin(async move {
            self.journal.statements.lock().unwrap().push(statement);
            match &self.reply {
                Reply::Result(raw) => Ok(raw.clone()),
                Reply::Fail(message) => Err(CrudError::Driver(message.clone())),
            }
        })
    }

    fn is_pooled(&self) -> bool {
        self.pooled
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            self.journal.closed.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                Err(CrudError::Connection(String::from("socket already gone")))
            } else {
                Ok(())
            }
        })
    }
}

pub struct MockProvider {
    pub reply: Reply,
    pub pooled: bool,
    pub fail_close: bool,
    pub journal: Arc<Journal>,
}

impl MockProvider {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            pooled: false,
            fail_close: false,
            journal: Arc::new(Journal::default()),
        }
    }

    pub fn connection(&self, dialect: Dialect) -> Box<dyn Connection> {
        Box::new(MockConnection {
            dialect,
            reply: self.reply.clone(),
            pooled: self.pooled,
            fail_close: self.fail_close,
            journal: Arc::clone(&self.journal),
        })
    }
}

impl ConnectionProvider for MockProvider {
    fn connect<'a>(
        &'a self,
        dialect: Dialect,
        _config: &'a ConnectionConfig,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>> {
        Box::pin(async move {
            self.journal.connects.fetch_add(1, Ordering::SeqCst);
            Ok(self.connection(dialect))
        })
    }
}

pub fn ok_packet(affected_rows: u64) -> Reply {
    Reply::Result(RawResult::MariaDb(polycrud_core::MariaDbOutcome::Ok {
        affected_rows,
        last_insert_id: 0,
    }))
}
