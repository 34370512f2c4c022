//! Structural properties of emitted statements across dialects.

mod common;
use common::*;

use polycrud_core::{Dialect, Operation, ParamSet, ParamValue, PlaceholderStyle};

#[test]
fn test_insert_columns_follow_param_order() {
    let params = sample(&["Zeta", "Alpha", "ID", "Mid"]);
    for dialect in Dialect::ALL {
        if !dialect.supports(Operation::Create) {
            continue;
        }
        let stmt = build(dialect, Operation::Create, &params);
        let columns: Vec<&str> = between(&stmt.sql, "(", ")").split(", ").collect();
        let values: Vec<&str> = between(&stmt.sql, "VALUES (", ")").split(", ").collect();

        assert_eq!(columns, vec!["Zeta", "Alpha", "ID", "Mid"], "{dialect}");
        assert_eq!(values.len(), columns.len(), "{dialect}");
        assert_eq!(stmt.bindings, columns, "{dialect}");
        if dialect.placeholder_style().is_named() {
            for (column, value) in columns.iter().zip(&values) {
                assert_eq!(&value[1..], *column, "{dialect}");
            }
        }
    }
}

#[test]
fn test_update_binds_identity_once_in_where() {
    let params = ParamSet::new()
        .with("ID", "u2")
        .with("Name", "x")
        .with("Text", "y");
    for dialect in Dialect::ALL {
        let stmt = build(dialect, Operation::Update, &params);
        let set_clause = between(&stmt.sql, " SET ", " WHERE ");
        let where_clause = &stmt.sql[stmt.sql.find(" WHERE ").unwrap()..];

        assert!(!set_clause.contains("ID"), "{dialect}: {}", stmt.sql);
        assert_eq!(where_clause.matches("ID =").count(), 1, "{dialect}");
        assert_eq!(stmt.bindings.last().map(String::as_str), Some("ID"));
        assert_eq!(stmt.bindings.iter().filter(|b| *b == "ID").count(), 1);
    }
}

#[test]
fn test_delete_sql_carries_no_values() {
    let params = ParamSet::new()
        .with("ID", "secret-id-value")
        .with("Name", "secret-name");
    for dialect in Dialect::ALL {
        if !dialect.supports(Operation::Delete) {
            continue;
        }
        let stmt = build(dialect, Operation::Delete, &params);
        assert!(!stmt.sql.contains("secret"), "{dialect}: {}", stmt.sql);
        assert!(!stmt.sql.contains("Name"), "{dialect}: {}", stmt.sql);
        assert_eq!(stmt.bindings, vec!["ID"]);
    }
}

#[test]
fn test_read_without_conditions_for_every_dialect() {
    for dialect in Dialect::ALL {
        let stmt = build(dialect, Operation::Read, &ParamSet::new());
        assert_eq!(stmt.sql, "SELECT * FROM Test");
        assert!(stmt.bindings.is_empty());
    }
}

#[test]
fn test_read_with_only_control_keys_has_no_where() {
    let params = ParamSet::new().with("partialMatch", true);
    for dialect in Dialect::ALL {
        let stmt = build(dialect, Operation::Read, &params);
        assert_eq!(stmt.sql, "SELECT * FROM Test");
    }
}

#[test]
fn test_numbered_placeholders_strictly_increase() {
    let params = ParamSet::new()
        .with("Name", "a")
        .with("Building", "b")
        .with("Owner", "c")
        .with("ID", "d");

    let read = build(Dialect::Postgres, Operation::Read, &params);
    assert_eq!(numbered_placeholders(&read.sql), vec![1, 2, 3, 4]);

    let create = build(Dialect::Postgres, Operation::Create, &params);
    assert_eq!(numbered_placeholders(&create.sql), vec![1, 2, 3, 4]);

    let update = build(Dialect::Postgres, Operation::Update, &params);
    assert_eq!(numbered_placeholders(&update.sql), vec![1, 2, 3, 4]);
    assert!(update.sql.ends_with("WHERE ID = $4;"));
}

#[test]
fn test_two_condition_read_on_postgres() {
    let params = ParamSet::new().with("Name", "a").with("Team", "b");
    let stmt = build(Dialect::Postgres, Operation::Read, &params);
    assert_eq!(stmt.sql, "SELECT * FROM Test WHERE Name = $1 AND Team = $2");
}

#[test]
fn test_placeholder_syntax_per_dialect() {
    let params = ParamSet::new().with("Name", "a");
    let expected = [
        (Dialect::Mssql, "SELECT * FROM Test WHERE Name = @Name"),
        (Dialect::Oracle, "SELECT * FROM Test WHERE Name = :Name"),
        (Dialect::MariaDb, "SELECT * FROM Test WHERE Name = ?"),
        (Dialect::Postgres, "SELECT * FROM Test WHERE Name = $1"),
    ];
    for (dialect, sql) in expected {
        assert_eq!(build(dialect, Operation::Read, &params).sql, sql);
    }
    assert_eq!(
        Dialect::Oracle.placeholder_style(),
        PlaceholderStyle::Named(':')
    );
}

#[test]
fn test_oracle_update_has_no_terminator() {
    let params = ParamSet::new().with("Name", "x").with("ID", "u1");
    let stmt = build(Dialect::Oracle, Operation::Update, &params);
    assert_eq!(stmt.sql, "UPDATE Test SET Name = :Name WHERE ID = :ID");
}

#[test]
fn test_resolved_params_align_with_placeholders() {
    let params = ParamSet::new()
        .with("Team", "core")
        .with("ID", "7f1c2a90-1d4b-4e0e-8a65-3c1f0b2d9e44")
        .with("Count", 3_i64)
        .with("Username", "Admin");
    for dialect in [Dialect::MariaDb, Dialect::Postgres] {
        let plan = plan(dialect, Operation::Update, &params);
        let values: Vec<&ParamValue> = plan.params().iter().map(|p| &p.value).collect();
        assert_eq!(
            values,
            vec![
                &ParamValue::Text(String::from("core")),
                &ParamValue::Int(3),
                &ParamValue::Text(String::from("admin")),
                &ParamValue::Text(String::from("7f1c2a90-1d4b-4e0e-8a65-3c1f0b2d9e44")),
            ],
            "{dialect}"
        );
    }
}
