use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::constants::corpus::JSONL_EXTENSION;
use crate::errors::DatasetError;

/// Read every line of `path` for `task`.
///
/// A file that cannot be opened maps to [`DatasetError::SourceNotFound`];
/// failures while reading an opened file surface as IO errors.
pub fn read_lines(task: &str, path: &Path) -> Result<Vec<String>, DatasetError> {
    let file = File::open(path).map_err(|_| DatasetError::SourceNotFound {
        task: task.to_string(),
        path: path.to_path_buf(),
    })?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

/// `<dir>/<task>.jsonl`, the per-task corpus path of a multi-task directory.
pub fn task_jsonl_path(dir: &Path, task: &str) -> PathBuf {
    dir.join(format!("{task}.{JSONL_EXTENSION}"))
}
