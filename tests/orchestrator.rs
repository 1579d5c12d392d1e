//! End-to-end runs of the orchestrator against in-memory databases.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use pg_reconcile::{Orchestrator, RunOptions, RunSummary, StatementStyle};
use reconcile_core::{
    CatalogProvider, Row, RowSource, ScriptSink, ScriptWriter, TableSchema, Value,
};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::Span;

struct MemoryCatalog {
    tables: Vec<TableSchema>,
}

#[async_trait]
impl CatalogProvider for MemoryCatalog {
    async fn list_primary_key_schemas(&self) -> Result<Vec<TableSchema>> {
        Ok(self.tables.clone())
    }
}

/// Serves fixed rows per table and records every fetch.
#[derive(Default)]
struct MemoryDatabase {
    name: &'static str,
    tables: HashMap<String, Vec<Row>>,
    failing_table: Option<String>,
    fetches: Mutex<Vec<String>>,
}

impl MemoryDatabase {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn with_table(mut self, table: &str, rows: Vec<Row>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    fn failing_on(mut self, table: &str) -> Self {
        self.failing_table = Some(table.to_string());
        self
    }

    fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowSource for MemoryDatabase {
    async fn fetch_all_ordered(
        &self,
        table_name: &str,
        _order_columns: &[String],
    ) -> Result<Vec<Row>> {
        self.fetches
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.name, table_name));

        if self.failing_table.as_deref() == Some(table_name) {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.tables.get(table_name).cloned().unwrap_or_default())
    }
}

fn table(name: &str, keys: &[&str]) -> TableSchema {
    TableSchema::new("public", name, format!("{name}_pkey"), keys.iter().copied()).unwrap()
}

fn person(id: i64, name: &str) -> Row {
    Row::from_pairs([("id", Value::Int(id)), ("name", Value::text(name))])
}

fn banner(table: &str) -> String {
    let rule = format!("/* {} */", "*".repeat(50));
    format!("\n\n{rule}\n/* {table}\n{rule}\n")
}

async fn run(
    catalog: &MemoryCatalog,
    source: &MemoryDatabase,
    candidate: &MemoryDatabase,
    options: RunOptions,
) -> Result<(RunSummary, String)> {
    let mut writer = ScriptWriter::new(Vec::new());
    let summary = Orchestrator::new(catalog, source, candidate, &mut writer, Span::none())
        .with_options(options)
        .run()
        .await?;
    Ok((summary, String::from_utf8(writer.into_inner())?))
}

#[tokio::test]
async fn test_inserts_and_updates_get_their_own_banner() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("t", &["id"])],
    };
    let source = MemoryDatabase::new("source").with_table("t", vec![person(1, "a")]);
    let candidate =
        MemoryDatabase::new("candidate").with_table("t", vec![person(1, "b"), person(2, "c")]);

    let (summary, script) = run(&catalog, &source, &candidate, RunOptions::default()).await?;

    let expected = format!(
        "{}INSERT INTO t (id,name) VALUES (2,'c')\n{}UPDATE t SET name='b';\n",
        banner("t"),
        banner("t")
    );
    assert_eq!(script, expected);
    assert_eq!(summary.inserts, 1);
    assert_eq!(summary.updates, 1);
    assert_eq!(summary.tables_changed, 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_source_inserts_every_candidate_row() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("t", &["id"])],
    };
    let source = MemoryDatabase::new("source");
    let candidate = MemoryDatabase::new("candidate").with_table("t", vec![person(5, "x")]);

    let (summary, script) = run(&catalog, &source, &candidate, RunOptions::default()).await?;

    assert_eq!(
        script,
        format!("{}INSERT INTO t (id,name) VALUES (5,'x')\n", banner("t"))
    );
    assert_eq!(summary.inserts, 1);
    assert_eq!(summary.updates, 0);
    Ok(())
}

#[tokio::test]
async fn test_unchanged_table_writes_nothing() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("t", &["id"])],
    };
    let source = MemoryDatabase::new("source").with_table("t", vec![person(1, "a")]);
    let candidate = MemoryDatabase::new("candidate").with_table("t", vec![person(1, "a")]);

    let (summary, script) = run(&catalog, &source, &candidate, RunOptions::default()).await?;

    assert!(script.is_empty());
    assert_eq!(summary.tables_scanned, 1);
    assert_eq!(summary.tables_changed, 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_candidate_skips_table_without_reading_source() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("empty", &["id"]), table("t", &["id"])],
    };
    let source = MemoryDatabase::new("source")
        .with_table("empty", vec![person(1, "a")])
        .with_table("t", vec![person(1, "a")]);
    let candidate = MemoryDatabase::new("candidate").with_table("t", vec![person(2, "b")]);

    let (summary, script) = run(&catalog, &source, &candidate, RunOptions::default()).await?;

    assert_eq!(
        script,
        format!("{}INSERT INTO t (id,name) VALUES (2,'b')\n", banner("t"))
    );
    assert_eq!(summary.tables_skipped_empty, 1);
    assert_eq!(source.fetches(), vec!["source:t"]);
    assert_eq!(candidate.fetches(), vec!["candidate:empty", "candidate:t"]);
    Ok(())
}

#[tokio::test]
async fn test_tables_follow_catalog_order() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("b", &["id"]), table("a", &["id"])],
    };
    let source = MemoryDatabase::new("source");
    let candidate = MemoryDatabase::new("candidate")
        .with_table("a", vec![person(1, "x")])
        .with_table("b", vec![person(1, "y")]);

    let (_, script) = run(&catalog, &source, &candidate, RunOptions::default()).await?;

    let expected = format!(
        "{}INSERT INTO b (id,name) VALUES (1,'y')\n{}INSERT INTO a (id,name) VALUES (1,'x')\n",
        banner("b"),
        banner("a")
    );
    assert_eq!(script, expected);
    Ok(())
}

#[tokio::test]
async fn test_composite_key_update_excludes_every_key_column() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("membership", &["account_id", "group_id"])],
    };
    let row = |account: i64, group: i64, role: &str| {
        Row::from_pairs([
            ("account_id", Value::Int(account)),
            ("group_id", Value::Int(group)),
            ("role", Value::text(role)),
            ("expires", Value::Null),
        ])
    };
    let source = MemoryDatabase::new("source").with_table("membership", vec![row(1, 1, "member")]);
    let candidate =
        MemoryDatabase::new("candidate").with_table("membership", vec![row(1, 1, "admin")]);

    let (_, script) = run(&catalog, &source, &candidate, RunOptions::default()).await?;

    assert_eq!(
        script,
        format!(
            "{}UPDATE membership SET role='admin',expires=NULL;\n",
            banner("membership")
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_upsert_style() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("t", &["id"])],
    };
    let source = MemoryDatabase::new("source").with_table("t", vec![person(1, "a")]);
    let candidate =
        MemoryDatabase::new("candidate").with_table("t", vec![person(1, "b"), person(2, "c")]);
    let options = RunOptions {
        statement_style: StatementStyle::Upsert,
        ..Default::default()
    };

    let (_, script) = run(&catalog, &source, &candidate, options).await?;

    let expected = format!(
        "{}INSERT INTO t (id,name) VALUES (2,'c') ON CONFLICT ON CONSTRAINT t_pkey DO UPDATE SET name='c';\n\
         {}INSERT INTO t (id,name) VALUES (1,'b') ON CONFLICT ON CONSTRAINT t_pkey DO UPDATE SET name='b';\n",
        banner("t"),
        banner("t")
    );
    assert_eq!(script, expected);
    Ok(())
}

#[tokio::test]
async fn test_table_filter() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("a", &["id"]), table("b", &["id"])],
    };
    let source = MemoryDatabase::new("source");
    let candidate = MemoryDatabase::new("candidate")
        .with_table("a", vec![person(1, "x")])
        .with_table("b", vec![person(1, "y")]);
    let options = RunOptions {
        tables: vec!["b".to_string(), "missing".to_string()],
        ..Default::default()
    };

    let (summary, script) = run(&catalog, &source, &candidate, options).await?;

    assert_eq!(
        script,
        format!("{}INSERT INTO b (id,name) VALUES (1,'y')\n", banner("b"))
    );
    assert_eq!(summary.tables_scanned, 1);
    assert_eq!(candidate.fetches(), vec!["candidate:b"]);
    Ok(())
}

#[tokio::test]
async fn test_dry_run_counts_without_writing() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("t", &["id"])],
    };
    let source = MemoryDatabase::new("source").with_table("t", vec![person(1, "a")]);
    let candidate =
        MemoryDatabase::new("candidate").with_table("t", vec![person(1, "b"), person(2, "c")]);
    let options = RunOptions {
        dry_run: true,
        ..Default::default()
    };

    let (summary, script) = run(&catalog, &source, &candidate, options).await?;

    assert!(script.is_empty());
    assert_eq!(summary.inserts, 1);
    assert_eq!(summary.updates, 1);
    Ok(())
}

#[tokio::test]
async fn test_fetch_failure_aborts_after_earlier_tables() -> Result<()> {
    let catalog = MemoryCatalog {
        tables: vec![table("a", &["id"]), table("b", &["id"]), table("c", &["id"])],
    };
    let source = MemoryDatabase::new("source").failing_on("b");
    let candidate = MemoryDatabase::new("candidate")
        .with_table("a", vec![person(1, "x")])
        .with_table("b", vec![person(1, "y")])
        .with_table("c", vec![person(1, "z")]);

    let mut writer = ScriptWriter::new(Vec::new());
    let err = Orchestrator::new(&catalog, &source, &candidate, &mut writer, Span::none())
        .run()
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Failed to read table b from the source database"));
    assert_eq!(
        String::from_utf8(writer.into_inner())?,
        format!("{}INSERT INTO a (id,name) VALUES (1,'x')\n", banner("a"))
    );
    assert!(!candidate.fetches().contains(&"candidate:c".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_file_sink_appends_across_runs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("delta.sql");
    std::fs::write(&path, "-- existing\n")?;

    let catalog = MemoryCatalog {
        tables: vec![table("t", &["id"])],
    };
    let source = MemoryDatabase::new("source");
    let candidate = MemoryDatabase::new("candidate").with_table("t", vec![person(1, "a")]);

    for _ in 0..2 {
        let mut writer = ScriptWriter::append_to_file(&path)?;
        Orchestrator::new(&catalog, &source, &candidate, &mut writer, Span::none())
            .run()
            .await?;
        writer.flush()?;
    }

    let statement = format!("{}INSERT INTO t (id,name) VALUES (1,'a')\n", banner("t"));
    assert_eq!(
        std::fs::read_to_string(&path)?,
        format!("-- existing\n{statement}{statement}")
    );
    Ok(())
}
