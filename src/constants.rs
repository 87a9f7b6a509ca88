/// Constants used by dataset construction defaults.
pub mod dataset {
    /// Default number of samples per task-homogeneous batch.
    pub const DEFAULT_BATCH_SIZE: usize = 32;
    /// Default seed for the planning RNG.
    pub const DEFAULT_SEED: u64 = 42;
    /// Label attached to every materialized training tuple.
    pub const CONTRASTIVE_LABEL: f32 = 1.0;
}

/// Constants used by corpus templating.
pub mod templating {
    /// Default separator injected before raw query/positive/negative text.
    pub const DEFAULT_SEPARATOR: &str = "!@#$%^&*()";
    /// Delimiter placed between an instruction and the separator.
    pub const INSTRUCTION_DELIMITER: &str = "; ";
}

/// Constants used when merging shard variants of a task.
pub mod aggregate {
    /// Suffixes marking separately sourced shards of one logical task.
    pub const DEFAULT_SHARD_SUFFIXES: [&str; 2] = ["_split1", "_split2"];
    /// Bucket name for records loaded without a task tag.
    pub const IMPLICIT_TASK_NAME: &str = "default";
}

/// Field names read from parsed corpus rows.
pub mod fields {
    use crate::types::FieldName;

    /// Query text field.
    pub const QUERY: FieldName = "query";
    /// Positive text field.
    pub const POSITIVE: FieldName = "positive";
    /// Negative text field.
    pub const NEGATIVE: FieldName = "negative";
}

/// Constants used by on-disk corpus layouts.
pub mod corpus {
    /// File extension for line-delimited JSON task corpora.
    pub const JSONL_EXTENSION: &str = "jsonl";
}

/// Constants used by the built-in dataset families.
pub mod families {
    /// Task name given to the Wiki1M line corpus.
    pub const WIKI1M_TASK: &str = "wiki1m";
}
