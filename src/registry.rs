//! Built-in dataset families and name-based loading.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::config::{CorpusFormat, DatasetConfig};
use crate::constants::families::WIKI1M_TASK;
use crate::dataset::TaskBatchedDataset;
use crate::errors::DatasetError;
use crate::loader::CorpusLoader;
use crate::source::{JsonlSource, RecordSource, TextLineSource};

/// Dataset families that can be loaded by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFamily {
    /// Multi-task retrieval triplets: a directory of `<task>.jsonl` files,
    /// one per task registered in the prompt table.
    E5,
    /// Single-task sentence corpus: one text file, one sentence per line.
    Wiki1M,
}

impl fmt::Display for DatasetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetFamily::E5 => f.write_str("E5"),
            DatasetFamily::Wiki1M => f.write_str("Wiki1M"),
        }
    }
}

impl FromStr for DatasetFamily {
    type Err = DatasetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "e5" => Ok(DatasetFamily::E5),
            "wiki1m" => Ok(DatasetFamily::Wiki1M),
            other => Err(DatasetError::Configuration(format!(
                "dataset name '{other}' not supported"
            ))),
        }
    }
}

/// Load a dataset of `family` from `path`.
///
/// The family fixes the corpus format: E5 reads triplets, Wiki1M reads text
/// lines as one implicit task. A missing task file aborts the whole load.
pub fn load_dataset(
    family: DatasetFamily,
    path: impl AsRef<Path>,
    config: DatasetConfig,
) -> Result<TaskBatchedDataset, DatasetError> {
    let path = path.as_ref();
    info!(family = %family, path = %path.display(), "[taskbatch:registry] loading dataset");
    match family {
        DatasetFamily::E5 => {
            let config = config.with_format(CorpusFormat::Triplet);
            let sources: Vec<JsonlSource> = config
                .prompts
                .tasks()
                .map(|task| JsonlSource::in_dir(path, task.as_str()))
                .collect();
            TaskBatchedDataset::from_sources(
                config,
                sources.iter().map(|source| source as &dyn RecordSource),
            )
        }
        DatasetFamily::Wiki1M => {
            let config = config.with_format(CorpusFormat::TextLines).validated()?;
            let source = TextLineSource::new(WIKI1M_TASK, path);
            let records = CorpusLoader::from_config(&config)
                .with_implicit_task(true)
                .load(&source)?;
            TaskBatchedDataset::from_records(config, records)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_family_names() {
        assert_eq!("E5".parse::<DatasetFamily>().unwrap(), DatasetFamily::E5);
        assert_eq!(
            "wiki1m".parse::<DatasetFamily>().unwrap(),
            DatasetFamily::Wiki1M
        );
        assert!(matches!(
            "simcse".parse::<DatasetFamily>().unwrap_err(),
            DatasetError::Configuration(_)
        ));
        assert_eq!(DatasetFamily::Wiki1M.to_string(), "Wiki1M");
    }
}
