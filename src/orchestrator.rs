//! Table-by-table reconciliation run.
//!
//! The orchestrator walks the primary-key catalog, fetches each table from
//! both databases one after the other, classifies the candidate rows and
//! appends the rendered statements to the script sink. Tables are handled
//! strictly in sequence and nothing is kept between them.

use anyhow::{Context, Result};
use clap::ValueEnum;
use reconcile_core::render::{render_insert, render_update, render_upsert};
use reconcile_core::{reconcile, CatalogProvider, Row, RowSource, ScriptSink, TableSchema};
use serde::Serialize;
use tracing::{debug, info, warn, Span};

/// Shape of the statements written for changed rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StatementStyle {
    /// Bare INSERT for new rows, UPDATE for changed rows
    #[default]
    #[value(name = "plain")]
    Plain,
    /// INSERT ... ON CONFLICT ON CONSTRAINT ... for both
    #[value(name = "upsert")]
    Upsert,
}

/// Knobs for a single run.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub statement_style: StatementStyle,
    /// Restrict the run to these tables; empty means all of them
    pub tables: Vec<String>,
    /// Reconcile and count, but write nothing
    pub dry_run: bool,
}

/// Counters for a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Tables taken from the catalog (after filtering)
    pub tables_scanned: usize,
    /// Tables skipped because the candidate side had no rows
    pub tables_skipped_empty: usize,
    /// Tables with at least one INSERT or UPDATE
    pub tables_changed: usize,
    pub inserts: usize,
    pub updates: usize,
}

/// Drives one reconciliation pass over every catalog table.
///
/// All log events are parented on the span handed to [`Orchestrator::new`].
pub struct Orchestrator<'a> {
    catalog: &'a dyn CatalogProvider,
    source: &'a dyn RowSource,
    candidate: &'a dyn RowSource,
    sink: &'a mut dyn ScriptSink,
    options: RunOptions,
    span: Span,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        catalog: &'a dyn CatalogProvider,
        source: &'a dyn RowSource,
        candidate: &'a dyn RowSource,
        sink: &'a mut dyn ScriptSink,
        span: Span,
    ) -> Self {
        Self {
            catalog,
            source,
            candidate,
            sink,
            options: RunOptions::default(),
            span,
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Process every table once. The first error aborts the run.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let tables = self
            .catalog
            .list_primary_key_schemas()
            .await
            .context("Failed to read the primary-key catalog")?;
        let tables = self.select_tables(tables);

        info!(parent: &self.span, "Found {} tables to reconcile", tables.len());

        let mut summary = RunSummary::default();
        for table in &tables {
            summary.tables_scanned += 1;
            self.process_table(table, &mut summary).await?;
        }

        info!(
            parent: &self.span,
            tables = summary.tables_scanned,
            changed = summary.tables_changed,
            inserts = summary.inserts,
            updates = summary.updates,
            "Reconciliation completed"
        );
        Ok(summary)
    }

    fn select_tables(&self, tables: Vec<TableSchema>) -> Vec<TableSchema> {
        if self.options.tables.is_empty() {
            return tables;
        }

        for wanted in &self.options.tables {
            if !tables.iter().any(|t| t.table_name() == wanted) {
                warn!(
                    parent: &self.span,
                    table = %wanted,
                    "Requested table has no primary key in the catalog, ignoring"
                );
            }
        }

        tables
            .into_iter()
            .filter(|t| self.options.tables.iter().any(|w| w == t.table_name()))
            .collect()
    }

    async fn process_table(
        &mut self,
        table: &TableSchema,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let table_name = table.table_name();
        let key_columns = table.key_columns();
        debug!(parent: &self.span, table = table_name, keys = ?key_columns, "Processing table");

        let candidate_rows = self
            .candidate
            .fetch_all_ordered(table_name, key_columns)
            .await
            .with_context(|| format!("Failed to read table {table_name} from the candidate database"))?;

        if candidate_rows.is_empty() {
            debug!(parent: &self.span, table = table_name, "Candidate table is empty, skipping");
            summary.tables_skipped_empty += 1;
            return Ok(());
        }

        let source_rows = self
            .source
            .fetch_all_ordered(table_name, key_columns)
            .await
            .with_context(|| format!("Failed to read table {table_name} from the source database"))?;

        let outcome = reconcile(&source_rows, &candidate_rows, key_columns);
        info!(
            parent: &self.span,
            table = table_name,
            source_rows = source_rows.len(),
            candidate_rows = candidate_rows.len(),
            inserts = outcome.to_insert.len(),
            updates = outcome.to_update.len(),
            "Reconciled table"
        );

        if outcome.is_empty() {
            return Ok(());
        }

        summary.tables_changed += 1;
        summary.inserts += outcome.to_insert.len();
        summary.updates += outcome.to_update.len();

        if self.options.dry_run {
            debug!(parent: &self.span, table = table_name, "Dry-run: not writing statements");
            return Ok(());
        }

        if !outcome.to_insert.is_empty() {
            self.sink.write_banner(table_name)?;
            for row in &outcome.to_insert {
                let statement = self.render_insert(table, row)?;
                self.sink.write_line(&statement)?;
            }
        }

        if !outcome.to_update.is_empty() {
            self.sink.write_banner(table_name)?;
            for row in &outcome.to_update {
                let statement = self.render_update(table, row)?;
                self.sink.write_line(&statement)?;
            }
        }

        self.sink
            .flush()
            .with_context(|| format!("Failed to flush statements for table {table_name}"))?;
        Ok(())
    }

    fn render_insert(&self, table: &TableSchema, row: &Row) -> Result<String> {
        match self.options.statement_style {
            StatementStyle::Plain => Ok(render_insert(table.table_name(), row)),
            StatementStyle::Upsert => self.render_upsert(table, row),
        }
    }

    fn render_update(&self, table: &TableSchema, row: &Row) -> Result<String> {
        match self.options.statement_style {
            StatementStyle::Plain => Ok(render_update(
                table.table_name(),
                row,
                table.key_columns(),
            )?),
            StatementStyle::Upsert => self.render_upsert(table, row),
        }
    }

    fn render_upsert(&self, table: &TableSchema, row: &Row) -> Result<String> {
        Ok(render_upsert(
            table.table_name(),
            table.constraint_name(),
            row,
            table.key_columns(),
        )?)
    }
}
