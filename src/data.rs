use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::dataset::CONTRASTIVE_LABEL;
use crate::errors::DatasetError;
use crate::splits::SplitLabel;

pub use crate::types::{RecordId, TaskName};

/// Canonical in-memory representation of one labeled example.
///
/// Records are immutable once loaded; planning only ever handles their `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier assigned at load time, unique across one load.
    pub id: RecordId,
    /// Templated query text.
    pub query: String,
    /// Templated positive text.
    pub positive: String,
    /// Templated negative text, absent for self-paired corpora.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<String>,
    /// Owning task, absent for corpora with a single implicit task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<TaskName>,
}

/// Parsed corpus row before templating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawRecord {
    /// Row supplying explicit query/positive (and optionally negative) text.
    Paired {
        query: String,
        positive: String,
        negative: Option<String>,
    },
    /// Row whose single text serves as both query and positive.
    SelfPaired { text: String },
}

impl RawRecord {
    /// Split into `(query, positive, negative)` text parts.
    pub fn into_parts(self) -> (String, String, Option<String>) {
        match self {
            RawRecord::Paired {
                query,
                positive,
                negative,
            } => (query, positive, negative),
            RawRecord::SelfPaired { text } => (text.clone(), text, None),
        }
    }
}

/// Unit handed to a training consumer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingTuple {
    /// Opaque label for the tuple; empty for tuples built by this crate.
    pub identifier: String,
    /// `[query, positive]` or `[query, positive, negative]`.
    pub texts: Vec<String>,
    /// Contrastive label, always `1.0`.
    pub label: f32,
}

impl fmt::Display for TrainingTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<TrainingTuple> label: {}, texts: {}",
            self.label,
            self.texts.join("; ")
        )
    }
}

/// One task-homogeneous batch of materialized tuples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskBatch {
    /// Canonical task every sample in the batch belongs to.
    pub task: TaskName,
    /// Samples in epoch order.
    pub samples: Vec<TrainingTuple>,
}

impl TaskBatch {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Record {
    /// Build the training tuple for this record.
    ///
    /// Only the train split materializes; other splits fail with
    /// [`DatasetError::UnsupportedSplit`].
    pub fn materialize(&self, split: SplitLabel) -> Result<TrainingTuple, DatasetError> {
        if split != SplitLabel::Train {
            return Err(DatasetError::UnsupportedSplit(split));
        }
        let mut texts = Vec::with_capacity(3);
        texts.push(self.query.clone());
        texts.push(self.positive.clone());
        if let Some(negative) = &self.negative {
            texts.push(negative.clone());
        }
        Ok(TrainingTuple {
            identifier: String::new(),
            texts,
            label: CONTRASTIVE_LABEL,
        })
    }
}
