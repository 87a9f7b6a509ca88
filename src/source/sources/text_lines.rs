use std::path::{Path, PathBuf};

use crate::errors::DatasetError;
use crate::source::{RecordSource, SourceRow};
use crate::transport::fs::read_lines;
use crate::types::TaskName;

/// Corpus where each trimmed line is one self-paired record.
#[derive(Clone, Debug)]
pub struct TextLineSource {
    task: TaskName,
    path: PathBuf,
}

impl TextLineSource {
    /// Source for `task` reading `path`.
    pub fn new(task: impl Into<TaskName>, path: impl Into<PathBuf>) -> Self {
        Self {
            task: task.into(),
            path: path.into(),
        }
    }

    /// File this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for TextLineSource {
    fn task(&self) -> &str {
        &self.task
    }

    fn rows(&self) -> Result<Vec<SourceRow>, DatasetError> {
        Ok(read_lines(&self.task, &self.path)?
            .into_iter()
            .map(|line| SourceRow::Line(line.trim().to_string()))
            .collect())
    }
}
