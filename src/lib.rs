//! pg-reconcile
//!
//! Compares two PostgreSQL databases that share the same table schemas, a
//! source of truth and a candidate, and writes the INSERT / UPDATE script
//! that would bring the source of truth in line with the candidate rows.
//!
//! # Pipeline
//!
//! ```text
//! catalog (source) ──► for each table with a primary key
//!                        ├─ fetch candidate rows (skip table when empty)
//!                        ├─ fetch source rows
//!                        ├─ reconcile by primary key
//!                        └─ render + append to the script file
//! ```
//!
//! The script is never applied and rows missing from the candidate are
//! never deleted.
//!
//! # CLI Usage
//!
//! ```bash
//! # Connection strings and output path may also come from .env
//! pg-reconcile diff \
//!   --source-uri postgresql://localhost/official \
//!   --candidate-uri postgresql://localhost/integration \
//!   --output-script-file delta.sql
//!
//! # Show which tables would be compared
//! pg-reconcile catalog --source-uri postgresql://localhost/official --json
//! ```

use anyhow::Context;
use clap::Args;
use reconcile_core::ScriptWriter;
use std::io::Write;
use std::path::PathBuf;

pub mod orchestrator;

pub use orchestrator::{Orchestrator, RunOptions, RunSummary, StatementStyle};

/// Connection strings for both sides of the comparison.
#[derive(Args, Clone, Debug)]
pub struct DatabaseOpts {
    /// Source-of-truth PostgreSQL connection string
    #[arg(long, env = "DATABASE_OFFICIAL_URL")]
    pub source_uri: String,

    /// Candidate (integration) PostgreSQL connection string
    #[arg(long, env = "DATABASE_INTEGRATION_URL")]
    pub candidate_uri: String,
}

/// Where and how the script is written.
#[derive(Args, Clone, Debug)]
pub struct ScriptOpts {
    /// File the script is appended to (created if missing, never truncated)
    #[arg(long, env = "OUTPUT_SCRIPT_FILE")]
    pub output_script_file: PathBuf,

    /// Statement shape for changed rows
    #[arg(long, value_enum, default_value = "plain")]
    pub statement_style: StatementStyle,

    /// Tables to compare (comma-separated, empty means every table with a primary key)
    #[arg(long, value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Dry run mode - reconcile and report, but don't write the script
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run summary as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

impl ScriptOpts {
    /// Open the script sink for a run.
    ///
    /// In dry-run mode nothing is opened and statements are discarded, so
    /// the output file is neither created nor touched.
    pub fn open_script_sink(&self) -> anyhow::Result<ScriptWriter<Box<dyn Write>>> {
        if self.dry_run {
            return Ok(ScriptWriter::new(Box::new(std::io::sink())));
        }
        let writer = ScriptWriter::append_to_file(&self.output_script_file).with_context(|| {
            format!(
                "Failed to open output script {}",
                self.output_script_file.display()
            )
        })?;
        Ok(ScriptWriter::new(Box::new(writer.into_inner())))
    }
}

impl From<&ScriptOpts> for RunOptions {
    fn from(opts: &ScriptOpts) -> Self {
        Self {
            statement_style: opts.statement_style,
            tables: opts.tables.clone(),
            dry_run: opts.dry_run,
        }
    }
}
