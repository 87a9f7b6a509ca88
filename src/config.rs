use serde::{Deserialize, Serialize};

use crate::aggregate::ShardSuffixes;
use crate::constants::dataset::{DEFAULT_BATCH_SIZE, DEFAULT_SEED};
use crate::constants::templating::DEFAULT_SEPARATOR;
use crate::errors::DatasetError;
use crate::prompts::PromptTable;
use crate::splits::SplitLabel;

/// Shape of the rows a task corpus supplies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusFormat {
    /// `query`, `positive`, and `negative` are all required.
    #[default]
    Triplet,
    /// `query` and `positive` are required; `negative` is optional.
    Pair,
    /// Each row is one text used as both query and positive.
    TextLines,
}

/// Top-level dataset construction configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Split the dataset is constructed for; only `Train` materializes samples.
    pub split: SplitLabel,
    /// Samples per task-homogeneous batch. Must match the consumer's step size.
    pub batch_size: usize,
    /// Shuffle each task bucket before cutting batches.
    pub shuffle_within_task: bool,
    /// Token injected before every raw text. Must not occur in corpus text.
    pub separator: String,
    /// Seed for the planning RNG.
    pub seed: u64,
    /// Suffixes marking shard variants merged into one task.
    pub shard_suffixes: ShardSuffixes,
    /// Row shape of the task corpora.
    pub format: CorpusFormat,
    /// Instruction table and symmetric-template task list.
    pub prompts: PromptTable,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            split: SplitLabel::Train,
            batch_size: DEFAULT_BATCH_SIZE,
            shuffle_within_task: true,
            separator: DEFAULT_SEPARATOR.to_string(),
            seed: DEFAULT_SEED,
            shard_suffixes: ShardSuffixes::default(),
            format: CorpusFormat::default(),
            prompts: PromptTable::e5(),
        }
    }
}

impl DatasetConfig {
    /// Override the split.
    pub fn with_split(mut self, split: SplitLabel) -> Self {
        self.split = split;
        self
    }

    /// Override the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable or disable per-task shuffling.
    pub fn with_shuffle_within_task(mut self, shuffle_within_task: bool) -> Self {
        self.shuffle_within_task = shuffle_within_task;
        self
    }

    /// Override the separator token.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Override the planning seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the shard suffixes.
    pub fn with_shard_suffixes(mut self, shard_suffixes: ShardSuffixes) -> Self {
        self.shard_suffixes = shard_suffixes;
        self
    }

    /// Override the corpus row format.
    pub fn with_format(mut self, format: CorpusFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the prompt table.
    pub fn with_prompts(mut self, prompts: PromptTable) -> Self {
        self.prompts = prompts;
        self
    }

    /// Parse a configuration from JSON; omitted fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        serde_json::from_str(raw)
            .map_err(|err| DatasetError::Configuration(format!("invalid dataset config: {err}")))
    }

    /// Reject configurations that cannot produce a valid plan.
    pub fn validated(self) -> Result<Self, DatasetError> {
        if self.batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize(self.batch_size));
        }
        if self.separator.is_empty() {
            return Err(DatasetError::Configuration(
                "separator must be a non-empty token".to_string(),
            ));
        }
        Ok(self)
    }
}
