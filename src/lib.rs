#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Shard-variant merging into canonical task buckets.
pub mod aggregate;
/// Dataset construction configuration.
pub mod config;
/// Centralized constants used across loading, planning, and templating.
pub mod constants;
/// Record and training tuple types.
pub mod data;
/// Indexed dataset facade over a planned epoch.
pub mod dataset;
/// Task-homogeneous epoch planning.
pub mod epoch;
/// Reusable example runners shared by demos.
pub mod example_apps;
mod hash;
/// Corpus loading and task templating.
pub mod loader;
/// Aggregate metrics helpers.
pub mod metrics;
/// Instruction lookup table.
pub mod prompts;
/// Built-in dataset families.
pub mod registry;
/// Deterministic random number generation.
pub mod rng;
/// Corpus source traits and built-in sources.
pub mod source;
/// Split labels.
pub mod splits;
/// Input transports used by sources.
pub mod transport;
/// Shared type aliases.
pub mod types;

mod errors;

pub use aggregate::{ShardSuffixes, TaskBuckets, aggregate, aggregate_strict};
pub use config::{CorpusFormat, DatasetConfig};
pub use data::{RawRecord, Record, TaskBatch, TrainingTuple};
pub use dataset::TaskBatchedDataset;
pub use epoch::{EpochOrder, TaskPlanStats, plan};
pub use errors::DatasetError;
pub use loader::{CorpusLoader, LoadedCorpus};
pub use prompts::{Instruction, PromptTable, TemplateMode};
pub use registry::{DatasetFamily, load_dataset};
pub use rng::DeterministicRng;
pub use source::{InMemorySource, JsonlSource, RecordSource, SourceRow, TextLineSource};
pub use splits::SplitLabel;
pub use types::{CanonicalTaskName, RecordId, TaskName};
