#![allow(dead_code)]

use polycrud_core::{Dialect, Operation, ParamSet, QueryPlan, Statement, TypeCatalog};

pub const TABLE: &str = "Test";

pub fn build(dialect: Dialect, operation: Operation, params: &ParamSet) -> Statement {
    polycrud_core::build(dialect, TABLE, operation, params)
        .unwrap_or_else(|e| panic!("Failed to build {operation} for {dialect}: {e}"))
}

pub fn plan(dialect: Dialect, operation: Operation, params: &ParamSet) -> QueryPlan {
    QueryPlan::prepare(dialect, TABLE, operation, Some(params), &TypeCatalog::new())
        .unwrap_or_else(|e| panic!("Failed to prepare {operation} for {dialect}: {e}"))
}

/// Text between `open` and the next `close`, e.g. the column list of an INSERT.
pub fn between<'a>(sql: &'a str, open: &str, close: &str) -> &'a str {
    let start = sql
        .find(open)
        .unwrap_or_else(|| panic!("'{open}' not found in {sql}"))
        + open.len();
    let end = sql[start..]
        .find(close)
        .unwrap_or_else(|| panic!("'{close}' not found after '{open}' in {sql}"))
        + start;
    &sql[start..end]
}

/// Every `$n` index in order of appearance.
pub fn numbered_placeholders(sql: &str) -> Vec<usize> {
    sql.split('$')
        .skip(1)
        .map(|rest| {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().expect("placeholder index")
        })
        .collect()
}

pub fn sample(fields: &[&str]) -> ParamSet {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| (*f, format!("v{i}")))
        .collect()
}
