//! Driver results and their canonical form.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::operation::Operation;

/// One result row, keyed by column name in select order.
pub type Row = Map<String, Value>;

/// What a MariaDB connection reports for a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum MariaDbOutcome {
    /// A result set.
    Rows(Vec<Row>),
    /// An OK packet.
    Ok {
        /// Rows changed by the statement.
        affected_rows: u64,
        /// AUTO_INCREMENT value generated by an INSERT, 0 otherwise.
        last_insert_id: u64,
    },
}

/// The result shape each driver hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// SQL Server: an optional record set plus one count per batch statement.
    Mssql {
        /// First record set, if the batch produced one.
        recordset: Option<Vec<Row>>,
        /// Affected-row counts, one per statement.
        rows_affected: Vec<u64>,
    },
    /// Oracle: rows for queries, a count for DML.
    Oracle {
        /// Fetched rows.
        rows: Option<Vec<Row>>,
        /// Affected-row count.
        rows_affected: Option<u64>,
    },
    /// MariaDB: either a result set or an OK packet.
    MariaDb(MariaDbOutcome),
    /// PostgreSQL: rows plus the count from the command tag.
    Postgres {
        /// Returned rows.
        rows: Vec<Row>,
        /// Count reported by the command tag.
        row_count: Option<u64>,
    },
}

impl RawResult {
    /// Takes the rows, empty when the driver produced none.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Mssql { recordset, .. } => recordset.unwrap_or_default(),
            Self::Oracle { rows, .. } => rows.unwrap_or_default(),
            Self::MariaDb(MariaDbOutcome::Rows(rows)) | Self::Postgres { rows, .. } => rows,
            Self::MariaDb(MariaDbOutcome::Ok { .. }) => Vec::new(),
        }
    }

    /// Returns the number of rows changed, 0 when the driver did not say.
    #[must_use]
    pub fn affected_rows(&self) -> u64 {
        match self {
            Self::Mssql { rows_affected, .. } => rows_affected.iter().sum(),
            Self::Oracle { rows_affected, .. } => rows_affected.unwrap_or(0),
            Self::MariaDb(MariaDbOutcome::Ok { affected_rows, .. }) => *affected_rows,
            Self::MariaDb(MariaDbOutcome::Rows(_)) => 0,
            Self::Postgres { row_count, .. } => row_count.unwrap_or(0),
        }
    }
}

/// The dialect-independent result returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// READ: matching rows.
    Rows(Vec<Row>),
    /// UPDATE / DELETE: rows changed.
    Modified {
        /// Number of rows changed.
        affected_rows: u64,
    },
    /// CREATE: the row was inserted.
    Created,
}

impl Serialize for ExecutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Rows(rows) => rows.serialize(serializer),
            Self::Modified { affected_rows } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("affectedRows", affected_rows)?;
                map.end()
            }
            Self::Created => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("success", &true)?;
                map.end()
            }
        }
    }
}

/// Maps a driver result to the canonical shape for `operation`.
#[must_use]
pub fn normalize(operation: Operation, raw: RawResult) -> ExecutionResult {
    match operation {
        Operation::Read => ExecutionResult::Rows(raw.into_rows()),
        Operation::Update | Operation::Delete => ExecutionResult::Modified {
            affected_rows: raw.affected_rows(),
        },
        Operation::Create => ExecutionResult::Created,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str) -> Row {
        let mut row = Row::new();
        row.insert(String::from("ID"), json!(id));
        row.insert(String::from("Name"), json!("Test Item"));
        row
    }

    #[test]
    fn test_read_missing_recordset_is_empty() {
        let raw = RawResult::Mssql {
            recordset: None,
            rows_affected: vec![],
        };
        assert_eq!(normalize(Operation::Read, raw), ExecutionResult::Rows(vec![]));

        let raw = RawResult::Oracle {
            rows: None,
            rows_affected: None,
        };
        assert_eq!(normalize(Operation::Read, raw), ExecutionResult::Rows(vec![]));
    }

    #[test]
    fn test_read_rows() {
        let raw = RawResult::Postgres {
            rows: vec![row("a"), row("b")],
            row_count: Some(2),
        };
        match normalize(Operation::Read, raw) {
            ExecutionResult::Rows(rows) => assert_eq!(rows.len(), 2),
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn test_affected_rows_per_dialect() {
        let mssql = RawResult::Mssql {
            recordset: None,
            rows_affected: vec![1, 2],
        };
        assert_eq!(
            normalize(Operation::Update, mssql),
            ExecutionResult::Modified { affected_rows: 3 }
        );

        let maria = RawResult::MariaDb(MariaDbOutcome::Ok {
            affected_rows: 1,
            last_insert_id: 0,
        });
        assert_eq!(
            normalize(Operation::Delete, maria),
            ExecutionResult::Modified { affected_rows: 1 }
        );

        let pg = RawResult::Postgres {
            rows: vec![],
            row_count: None,
        };
        assert_eq!(
            normalize(Operation::Delete, pg),
            ExecutionResult::Modified { affected_rows: 0 }
        );
    }

    #[test]
    fn test_create_reports_success_only() {
        let raw = RawResult::MariaDb(MariaDbOutcome::Ok {
            affected_rows: 1,
            last_insert_id: 12,
        });
        let result = normalize(Operation::Create, raw);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"success": true}));
    }

    #[test]
    fn test_canonical_json() {
        let modified = ExecutionResult::Modified { affected_rows: 4 };
        assert_eq!(
            serde_json::to_value(&modified).unwrap(),
            json!({"success": true, "affectedRows": 4})
        );

        let rows = ExecutionResult::Rows(vec![row("a")]);
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            json!([{"ID": "a", "Name": "Test Item"}])
        );
    }
}
