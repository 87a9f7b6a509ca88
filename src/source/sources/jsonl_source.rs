use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::errors::DatasetError;
use crate::source::{RecordSource, SourceRow};
use crate::transport::fs::{read_lines, task_jsonl_path};
use crate::types::{LineNumber, TaskName};

/// Task corpus stored as one JSON object per line.
///
/// Whitespace-only lines are ignored; every other line must decode to a JSON
/// object or the whole read fails.
#[derive(Clone, Debug)]
pub struct JsonlSource {
    task: TaskName,
    path: PathBuf,
}

impl JsonlSource {
    /// Source for `task` reading `path`.
    pub fn new(task: impl Into<TaskName>, path: impl Into<PathBuf>) -> Self {
        Self {
            task: task.into(),
            path: path.into(),
        }
    }

    /// Source for `task` reading `<dir>/<task>.jsonl`.
    pub fn in_dir(dir: impl AsRef<Path>, task: impl Into<TaskName>) -> Self {
        let task = task.into();
        let path = task_jsonl_path(dir.as_ref(), &task);
        Self { task, path }
    }

    /// File this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonlSource {
    fn task(&self) -> &str {
        &self.task
    }

    fn rows(&self) -> Result<Vec<SourceRow>, DatasetError> {
        Ok(self
            .numbered_rows()?
            .into_iter()
            .map(|(_, row)| row)
            .collect())
    }

    fn numbered_rows(&self) -> Result<Vec<(LineNumber, SourceRow)>, DatasetError> {
        let lines = read_lines(&self.task, &self.path)?;
        let mut rows = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value = serde_json::from_str::<Value>(line.trim()).map_err(|err| {
                DatasetError::MalformedRecord {
                    task: self.task.clone(),
                    line: idx + 1,
                    details: format!("failed decoding JSON row: {err}"),
                }
            })?;
            match value {
                Value::Object(map) => rows.push((idx + 1, SourceRow::Object(map))),
                other => {
                    return Err(DatasetError::MalformedRecord {
                        task: self.task.clone(),
                        line: idx + 1,
                        details: format!("expected a JSON object, found {other}"),
                    });
                }
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_objects_and_skips_blank_lines() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("fever.jsonl"),
            "{\"query\":\"q1\",\"positive\":\"p1\",\"negative\":\"n1\"}\n\n{\"query\":\"q2\",\"positive\":\"p2\",\"negative\":\"n2\"}\n",
        )
        .unwrap();
        let source = JsonlSource::in_dir(temp.path(), "fever");
        assert_eq!(source.task(), "fever");
        assert!(source.path().ends_with("fever.jsonl"));
        let rows = source.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(matches!(&rows[0], SourceRow::Object(map) if map["query"] == "q1"));
        let lines: Vec<_> = source
            .numbered_rows()
            .unwrap()
            .into_iter()
            .map(|(line, _)| line)
            .collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn invalid_json_reports_line_number() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nq.jsonl");
        fs::write(&path, "{\"query\":\"q\"}\n{not json\n").unwrap();
        let err = JsonlSource::new("nq", &path).rows().unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn non_object_rows_are_malformed() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nq.jsonl");
        fs::write(&path, "[\"q\", \"p\"]\n").unwrap();
        let err = JsonlSource::new("nq", &path).rows().unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let temp = tempdir().unwrap();
        let err = JsonlSource::in_dir(temp.path(), "squad").rows().unwrap_err();
        assert!(matches!(err, DatasetError::SourceNotFound { ref task, .. } if task == "squad"));
    }
}
