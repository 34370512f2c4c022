//! End-to-end plans for the reference requests against table `Test`.

mod common;
use common::*;

use polycrud_core::{
    normalize, CrudError, Dialect, ExecutionResult, MariaDbOutcome, Operation, ParamSet,
    ParamValue, QueryPlan, RawResult, TypeCatalog,
};
use serde_json::json;

#[test]
fn test_create_on_mssql() {
    let params = ParamSet::new()
        .with("Name", "Test Item")
        .with("Text", "desc")
        .with("ID", "u1");
    let plan = plan(Dialect::Mssql, Operation::Create, &params);
    assert_eq!(
        plan.sql(),
        "INSERT INTO Test (Name, Text, ID) VALUES (@Name, @Text, @ID);"
    );

    let types: Vec<String> = plan
        .params()
        .iter()
        .map(|p| p.descriptor.to_string())
        .collect();
    assert_eq!(types, vec!["NVarChar(255)", "NVarChar(255)", "UniqueIdentifier"]);

    let raw = RawResult::Mssql {
        recordset: None,
        rows_affected: vec![1],
    };
    let result = normalize(plan.operation(), raw);
    assert_eq!(serde_json::to_value(&result).unwrap(), json!({"success": true}));
}

#[test]
fn test_update_on_mssql() {
    let params = ParamSet::new()
        .with("Name", "x")
        .with("Text", "y")
        .with("ID", "u2");
    let plan = plan(Dialect::Mssql, Operation::Update, &params);
    assert_eq!(
        plan.sql(),
        "UPDATE Test SET Name = @Name, Text = @Text WHERE ID = @ID;"
    );
}

#[test]
fn test_delete_on_mariadb() {
    let params = ParamSet::new().with("ID", "u3");
    let plan = plan(Dialect::MariaDb, Operation::Delete, &params);
    assert_eq!(plan.sql(), "DELETE FROM Test WHERE ID = ?;");
    assert_eq!(plan.params().len(), 1);
    assert_eq!(plan.params()[0].value, ParamValue::Text(String::from("u3")));

    let raw = RawResult::MariaDb(MariaDbOutcome::Ok {
        affected_rows: 1,
        last_insert_id: 0,
    });
    assert_eq!(
        serde_json::to_value(normalize(Operation::Delete, raw)).unwrap(),
        json!({"success": true, "affectedRows": 1})
    );
}

#[test]
fn test_read_everything_on_every_dialect() {
    for dialect in Dialect::ALL {
        let plan = plan(dialect, Operation::Read, &ParamSet::new());
        assert_eq!(plan.sql(), "SELECT * FROM Test");
    }

    let rows: Vec<_> = (1..=3)
        .map(|i| {
            json!({"ID": format!("u{i}"), "Name": "Test Item"})
                .as_object()
                .cloned()
                .unwrap()
        })
        .collect();
    let raw = RawResult::Postgres {
        rows: rows.clone(),
        row_count: Some(3),
    };
    assert_eq!(normalize(Operation::Read, raw), ExecutionResult::Rows(rows));
}

#[test]
fn test_create_on_oracle_is_rejected() {
    let params = ParamSet::new().with("Name", "Test Item").with("ID", "u1");
    let result = QueryPlan::prepare(
        Dialect::Oracle,
        TABLE,
        Operation::Create,
        Some(&params),
        &TypeCatalog::new(),
    );
    match result {
        Err(CrudError::UnsupportedOperation { operation, dialect }) => {
            assert_eq!(operation, Operation::Create);
            assert_eq!(dialect, Dialect::Oracle);
        }
        other => panic!("expected UnsupportedOperation, got {other:?}"),
    }
}

#[test]
fn test_catalog_file_overrides_heuristics() {
    let catalog = TypeCatalog::from_json(
        r#"{
            "dialects": {
                "POSTGRES": { "Name": { "type": "text" }, "Age": { "type": "int8" } },
                "MARIADB": { "Name": { "type": "varchar", "length": 80 } }
            }
        }"#,
    )
    .unwrap();
    let params = ParamSet::new().with("Name", "x").with("Age", "41");

    let pg = QueryPlan::prepare(
        Dialect::Postgres,
        TABLE,
        Operation::Create,
        Some(&params),
        &catalog,
    )
    .unwrap();
    assert_eq!(pg.params()[0].descriptor.to_string(), "text");
    assert_eq!(pg.params()[1].value, ParamValue::Int(41));

    let maria = QueryPlan::prepare(
        Dialect::MariaDb,
        TABLE,
        Operation::Create,
        Some(&params),
        &catalog,
    )
    .unwrap();
    assert_eq!(maria.params()[0].descriptor.to_string(), "varchar(80)");
    assert_eq!(maria.params()[1].descriptor.to_string(), "varchar(255)");
}

#[test]
fn test_request_body_order_drives_columns() {
    let params: ParamSet =
        serde_json::from_str(r#"{"Text": "desc", "ID": "u1", "Name": "Test Item"}"#).unwrap();
    let plan = plan(Dialect::MariaDb, Operation::Create, &params);
    assert_eq!(
        plan.sql(),
        "INSERT INTO Test (Text, ID, Name) VALUES (?, ?, ?);"
    );
}
