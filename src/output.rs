//! Helpers for consumers of the generated lines.
//!
//! Lines starting with `-- ERROR:` report problems, `-- CAUTION:` warns about
//! the destructive statement that follows, any other `--` line is a note, and
//! everything else is an executable statement.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::SchemaResult;
use crate::transpiler::COMMENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Command,
    Error,
    Caution,
    Note,
}

/// Classify an output line by its prefix.
pub fn classify(line: &str) -> LineKind {
    let Some(rest) = line.trim_start().strip_prefix(COMMENT) else {
        return LineKind::Command;
    };
    let rest = rest.trim_start();
    if rest.starts_with("ERROR:") {
        LineKind::Error
    } else if rest.starts_with("CAUTION:") {
        LineKind::Caution
    } else {
        LineKind::Note
    }
}

/// A line paired with its kind, for structured output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputLine<'a> {
    pub kind: LineKind,
    pub text: &'a str,
}

pub fn annotate(lines: &[String]) -> Vec<OutputLine<'_>> {
    lines
        .iter()
        .map(|line| OutputLine {
            kind: classify(line),
            text: line,
        })
        .collect()
}

/// Whether any line reports an error.
pub fn has_errors(lines: &[String]) -> bool {
    lines.iter().any(|l| classify(l) == LineKind::Error)
}

/// A timestamped migration file.
///
/// ```text
/// migrations/
/// └── 20261018093400_rename_person.sql
/// ```
#[derive(Debug, Clone)]
pub struct MigrationFile {
    pub name: String,
    pub created: DateTime<Local>,
    pub lines: Vec<String>,
}

impl MigrationFile {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            created: Local::now(),
            lines,
        }
    }

    fn stem(&self) -> String {
        format!("{}_{}", self.created.format("%Y%m%d%H%M%S"), self.name)
    }

    pub fn file_name(&self) -> String {
        format!("{}.sql", self.stem())
    }

    /// Header comments, a blank line, then every generated line.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} @name: {}\n{} @created: {}\n\n",
            COMMENT,
            self.stem(),
            COMMENT,
            self.created.to_rfc3339()
        );
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Write into `dir`, creating it if needed. Returns the written path.
    pub fn write_to(&self, dir: &Path) -> SchemaResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, self.render())?;
        Ok(path)
    }
}
