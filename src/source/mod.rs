//! Corpus source interfaces.
//!
//! A `RecordSource` yields the parsed rows of one task corpus, in input
//! order. Sources do no templating and assign no ids; that is the loader's
//! job. Reading is blocking and all-or-nothing.

use serde_json::{Map, Value};

use crate::constants::fields;
use crate::errors::DatasetError;
use crate::types::{LineNumber, TaskName};

/// Source implementation modules.
pub mod sources;

pub use sources::jsonl_source::JsonlSource;
pub use sources::text_lines::TextLineSource;

/// One parsed input row.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceRow {
    /// A key-value record (one JSON object per line).
    Object(Map<String, Value>),
    /// A raw text line.
    Line(String),
}

impl SourceRow {
    /// Build an object row from `(key, text)` pairs.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        SourceRow::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect(),
        )
    }
}

/// Loader-facing corpus interface.
pub trait RecordSource: Send + Sync {
    /// Task name this corpus belongs to (shard variants keep their suffix).
    fn task(&self) -> &str;
    /// Read all rows in input order.
    fn rows(&self) -> Result<Vec<SourceRow>, DatasetError>;

    /// Rows paired with the 1-based input line they came from.
    ///
    /// Sources that skip input lines override this so errors cite the real line.
    fn numbered_rows(&self) -> Result<Vec<(LineNumber, SourceRow)>, DatasetError> {
        Ok(self
            .rows()?
            .into_iter()
            .enumerate()
            .map(|(idx, row)| (idx + 1, row))
            .collect())
    }
}

/// Source backed by rows already held in memory.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    task: TaskName,
    rows: Vec<SourceRow>,
}

impl InMemorySource {
    /// Create a source for `task` over `rows`.
    pub fn new(task: impl Into<TaskName>, rows: Vec<SourceRow>) -> Self {
        Self {
            task: task.into(),
            rows,
        }
    }

    /// Source of `(query, positive, negative)` triplets.
    pub fn from_triplets(task: impl Into<TaskName>, triplets: &[(&str, &str, &str)]) -> Self {
        let rows = triplets
            .iter()
            .map(|(query, positive, negative)| {
                SourceRow::from_fields([
                    (fields::QUERY, *query),
                    (fields::POSITIVE, *positive),
                    (fields::NEGATIVE, *negative),
                ])
            })
            .collect();
        Self::new(task, rows)
    }

    /// Source of raw text lines.
    pub fn from_lines(task: impl Into<TaskName>, lines: &[&str]) -> Self {
        let rows = lines
            .iter()
            .map(|line| SourceRow::Line(line.to_string()))
            .collect();
        Self::new(task, rows)
    }
}

impl RecordSource for InMemorySource {
    fn task(&self) -> &str {
        &self.task
    }

    fn rows(&self) -> Result<Vec<SourceRow>, DatasetError> {
        Ok(self.rows.clone())
    }
}
