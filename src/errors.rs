use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::splits::SplitLabel;
use crate::types::{FieldName, LineNumber, TaskName};

/// Error type for corpus loading, batch planning, and dataset access.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("corpus for task '{task}' not found at {}", path.display())]
    SourceNotFound { task: TaskName, path: PathBuf },
    #[error("line {line} of task '{task}' is missing required field '{field}'")]
    MissingField {
        task: TaskName,
        line: LineNumber,
        field: FieldName,
    },
    #[error("line {line} of task '{task}' is malformed: {details}")]
    MalformedRecord {
        task: TaskName,
        line: LineNumber,
        details: String,
    },
    #[error("split '{0}' cannot be materialized; only the train split yields samples")]
    UnsupportedSplit(SplitLabel),
    #[error("batch size must be positive (got {0})")]
    InvalidBatchSize(usize),
    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("task name '{name}' contains shard suffix '{suffix}' outside its tail")]
    AmbiguousTaskName { name: TaskName, suffix: String },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
