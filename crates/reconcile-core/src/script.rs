//! Append-only destination for rendered SQL.

use crate::error::Result;
use crate::render::banner_lines;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Receives rendered statements one line at a time.
pub trait ScriptSink {
    /// Append `line` followed by a newline.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Make everything written so far durable.
    fn flush(&mut self) -> Result<()>;

    /// Append the banner block that precedes a table's statements.
    fn write_banner(&mut self, table_name: &str) -> Result<()> {
        for line in banner_lines(table_name) {
            self.write_line(&line)?;
        }
        Ok(())
    }
}

/// [`ScriptSink`] over any [`Write`] implementation.
#[derive(Debug)]
pub struct ScriptWriter<W: Write> {
    inner: W,
    lines_written: u64,
}

impl ScriptWriter<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed. Existing content is kept.
    pub fn append_to_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ScriptWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            lines_written: 0,
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ScriptSink for ScriptWriter<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
