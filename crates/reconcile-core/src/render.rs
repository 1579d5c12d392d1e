//! SQL statement rendering.
//!
//! Identifiers are emitted verbatim and values go through
//! [`Value::to_sql_literal`]. INSERT statements carry no terminating
//! semicolon while UPDATE and upsert statements do; existing scripts depend
//! on that exact shape.

use crate::error::{ReconcileError, Result};
use crate::row::Row;
use crate::value::Value;

const BANNER_RULE_WIDTH: usize = 50;

/// `INSERT INTO <table> (<cols>) VALUES (<values>)` with every column in natural order.
pub fn render_insert(table_name: &str, row: &Row) -> String {
    let (columns, values) = columns_and_values(row);
    format!("INSERT INTO {table_name} ({columns}) VALUES ({values})")
}

/// `UPDATE <table> SET <col>=<value>,...;` over the non-key columns.
///
/// Fails when `key_columns` is empty since there is nothing to tell the SET
/// list apart from the primary key.
pub fn render_update(table_name: &str, row: &Row, key_columns: &[String]) -> Result<String> {
    let assignments = assignments(row, key_columns)?;
    Ok(format!("UPDATE {table_name} SET {assignments};"))
}

/// `INSERT ... ON CONFLICT ON CONSTRAINT <constraint>` followed by either
/// `DO UPDATE SET ...;` or, for key-only rows, `DO NOTHING;`.
pub fn render_upsert(
    table_name: &str,
    constraint_name: &str,
    row: &Row,
    key_columns: &[String],
) -> Result<String> {
    let assignments = assignments(row, key_columns)?;
    let insert = render_insert(table_name, row);

    if assignments.is_empty() {
        Ok(format!(
            "{insert} ON CONFLICT ON CONSTRAINT {constraint_name} DO NOTHING;"
        ))
    } else {
        Ok(format!(
            "{insert} ON CONFLICT ON CONSTRAINT {constraint_name} DO UPDATE SET {assignments};"
        ))
    }
}

/// The comment block written ahead of a table's statements, one entry per line.
///
/// The two leading empty lines separate it from whatever came before.
pub fn banner_lines(table_name: &str) -> [String; 5] {
    let rule = format!("/* {} */", "*".repeat(BANNER_RULE_WIDTH));
    [
        String::new(),
        String::new(),
        rule.clone(),
        format!("/* {table_name}"),
        rule,
    ]
}

fn columns_and_values(row: &Row) -> (String, String) {
    let columns: Vec<&str> = row.column_names().collect();
    let values: Vec<String> = row.iter().map(|(_, v)| v.to_sql_literal()).collect();
    (columns.join(","), values.join(","))
}

fn assignments(row: &Row, key_columns: &[String]) -> Result<String> {
    if key_columns.is_empty() {
        return Err(ReconcileError::InvalidInput(
            "key columns are required to render an UPDATE".to_string(),
        ));
    }

    let pairs: Vec<String> = row
        .non_key_projection(key_columns)
        .iter()
        .map(|(column, value)| {
            let literal = value.map_or_else(|| Value::Null.to_sql_literal(), Value::to_sql_literal);
            format!("{column}={literal}")
        })
        .collect();

    Ok(pairs.join(","))
}
