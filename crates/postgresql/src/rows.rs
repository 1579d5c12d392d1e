//! Full-table row fetcher.

use crate::client::PostgresDatabase;
use crate::error::PostgresError;
use crate::value::{convert_row, convert_value};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reconcile_core::{Row, RowSource};
use tracing::debug;

/// `SELECT * FROM <table> ORDER BY <columns>`, identifiers verbatim.
///
/// The ORDER BY clause is left out when no order column is given.
pub fn select_all_query(table_name: &str, order_columns: &[String]) -> String {
    if order_columns.is_empty() {
        format!("SELECT * FROM {table_name}")
    } else {
        format!(
            "SELECT * FROM {table_name} ORDER BY {}",
            order_columns.join(",")
        )
    }
}

/// Like [`select_all_query`] but with an explicit column list, casting the
/// columns named in `text_columns` to `text` under their own name.
///
/// Column names are double-quoted so mixed-case names survive.
pub fn select_with_text_columns(
    table_name: &str,
    columns: &[String],
    text_columns: &[String],
    order_columns: &[String],
) -> String {
    let select_list: Vec<String> = columns
        .iter()
        .map(|column| {
            let quoted = quote_ident(column);
            if text_columns.contains(column) {
                format!("{quoted}::text AS {quoted}")
            } else {
                quoted
            }
        })
        .collect();
    let mut query = format!("SELECT {} FROM {table_name}", select_list.join(", "));
    if !order_columns.is_empty() {
        query.push_str(" ORDER BY ");
        query.push_str(&order_columns.join(","));
    }
    query
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Names of the columns of `row` whose type has no native conversion.
fn unsupported_columns(row: &tokio_postgres::Row) -> Vec<String> {
    (0..row.columns().len())
        .filter_map(|i| match convert_value(row, i) {
            Err(PostgresError::UnsupportedType { column, .. }) => Some(column),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl RowSource for PostgresDatabase {
    async fn fetch_all_ordered(
        &self,
        table_name: &str,
        order_columns: &[String],
    ) -> Result<Vec<Row>> {
        let mut query = select_all_query(table_name, order_columns);
        let mut text_columns: Vec<String> = Vec::new();

        // Each pass either converts every row or adds at least one column
        // to the text casts, so this ends after at most one pass per column
        loop {
            debug!(database = %self.label, "Fetching rows with: {query}");

            let rows = self
                .client
                .query(&query, &[])
                .await
                .with_context(|| format!("Failed to read table {table_name} from {}", self.label))?;

            let failure = match rows.iter().map(convert_row).collect::<Result<Vec<_>, _>>() {
                Ok(converted) => return Ok(converted),
                Err(e) => e,
            };

            let column = match failure {
                PostgresError::UnsupportedType { column, type_name }
                    if !text_columns.contains(&column) =>
                {
                    debug!(
                        database = %self.label,
                        "Reading column {column} ({type_name}) of {table_name} as text"
                    );
                    column
                }
                other => {
                    return Err(other).with_context(|| {
                        format!("Failed to convert a row of {table_name} from {}", self.label)
                    })
                }
            };

            text_columns.push(column);
            let mut columns = Vec::new();
            if let Some(first) = rows.first() {
                columns = first.columns().iter().map(|c| c.name().to_string()).collect();
                for extra in unsupported_columns(first) {
                    if !text_columns.contains(&extra) {
                        text_columns.push(extra);
                    }
                }
            }
            query = select_with_text_columns(table_name, &columns, &text_columns, order_columns);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_single_key() {
        assert_eq!(
            select_all_query("users", &["id".to_string()]),
            "SELECT * FROM users ORDER BY id"
        );
    }

    #[test]
    fn test_select_all_composite_key() {
        assert_eq!(
            select_all_query(
                "memberships",
                &["account_id".to_string(), "group_id".to_string()]
            ),
            "SELECT * FROM memberships ORDER BY account_id,group_id"
        );
    }

    #[test]
    fn test_select_all_without_order() {
        assert_eq!(select_all_query("t", &[]), "SELECT * FROM t");
    }

    #[test]
    fn test_select_with_text_columns() {
        let columns = vec!["id".to_string(), "addr".to_string(), "Balance".to_string()];
        assert_eq!(
            select_with_text_columns(
                "wallets",
                &columns,
                &["addr".to_string(), "Balance".to_string()],
                &["id".to_string()]
            ),
            r#"SELECT "id", "addr"::text AS "addr", "Balance"::text AS "Balance" FROM wallets ORDER BY id"#
        );
        assert_eq!(
            select_with_text_columns("t", &["a\"b".to_string()], &[], &[]),
            r#"SELECT "a""b" FROM t"#
        );
    }
}
