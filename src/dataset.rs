//! Indexed access over a planned epoch order.

use tracing::info;

use crate::aggregate::{aggregate, group_by_task};
use crate::config::DatasetConfig;
use crate::data::{Record, TaskBatch, TrainingTuple};
use crate::epoch::{EpochOrder, plan};
use crate::errors::DatasetError;
use crate::loader::CorpusLoader;
use crate::rng::DeterministicRng;
use crate::source::RecordSource;
use crate::splits::SplitLabel;
use crate::types::RecordId;

/// Read-only dataset whose iteration order is fixed at construction.
///
/// Positions `i * batch_size .. (i + 1) * batch_size` always hold samples of
/// a single task. The order is planned once and reused for the lifetime of
/// the value; rebuild the dataset to get a different order.
#[derive(Clone, Debug)]
pub struct TaskBatchedDataset {
    split: SplitLabel,
    records: Vec<Record>,
    order: EpochOrder,
}

impl TaskBatchedDataset {
    /// Load `sources`, merge shard variants, and plan the epoch order.
    pub fn from_sources<'s, I>(config: DatasetConfig, sources: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = &'s dyn RecordSource>,
    {
        let config = config.validated()?;
        let corpus = CorpusLoader::from_config(&config).load_all(sources)?;
        Self::plan_records(&config, corpus.records, corpus.buckets)
    }

    /// Plan over already-loaded records, bucketing them by their task tag.
    pub fn from_records(config: DatasetConfig, mut records: Vec<Record>) -> Result<Self, DatasetError> {
        let config = config.validated()?;
        records.sort_by_key(|record| record.id);
        if let Some(pair) = records.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(DatasetError::Configuration(format!(
                "record id {} appears more than once",
                pair[0].id
            )));
        }
        let buckets = group_by_task(&records);
        Self::plan_records(&config, records, buckets)
    }

    fn plan_records<I>(
        config: &DatasetConfig,
        records: Vec<Record>,
        buckets: I,
    ) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (String, Vec<RecordId>)>,
    {
        let buckets = aggregate(buckets, &config.shard_suffixes);
        let mut rng = DeterministicRng::new(config.seed);
        let order = plan(buckets, config.batch_size, config.shuffle_within_task, &mut rng)?;
        info!(
            split = %config.split,
            samples = order.len(),
            fingerprint = order.fingerprint(),
            "[taskbatch:dataset] dataset ready"
        );
        Ok(Self {
            split: config.split,
            records,
            order,
        })
    }

    /// Number of samples in the epoch order.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no task filled a batch.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Split the dataset was constructed for.
    pub fn split(&self) -> SplitLabel {
        self.split
    }

    /// Batch size of the epoch order.
    pub fn batch_size(&self) -> usize {
        self.order.batch_size()
    }

    /// Number of full batches.
    pub fn batch_count(&self) -> usize {
        self.order.batch_count()
    }

    /// Task of batch `batch_idx`.
    pub fn batch_task(&self, batch_idx: usize) -> Option<&str> {
        self.order.batch_task(batch_idx)
    }

    /// Planned order.
    pub fn epoch_order(&self) -> &EpochOrder {
        &self.order
    }

    /// Record at position `index` of the epoch order.
    pub fn record(&self, index: usize) -> Result<&Record, DatasetError> {
        let id = self
            .order
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            })?;
        self.record_by_id(id)
    }

    fn record_by_id(&self, id: RecordId) -> Result<&Record, DatasetError> {
        self.records
            .binary_search_by_key(&id, |record| record.id)
            .map(|pos| &self.records[pos])
            .map_err(|_| {
                DatasetError::Configuration(format!("planned id {id} has no loaded record"))
            })
    }

    /// Training tuple at position `index`.
    ///
    /// Non-train splits fail with [`DatasetError::UnsupportedSplit`] before
    /// the index is checked.
    pub fn get(&self, index: usize) -> Result<TrainingTuple, DatasetError> {
        if self.split != SplitLabel::Train {
            return Err(DatasetError::UnsupportedSplit(self.split));
        }
        self.record(index)?.materialize(self.split)
    }

    /// Materialized batch `batch_idx`.
    pub fn batch(&self, batch_idx: usize) -> Result<TaskBatch, DatasetError> {
        let (Some(task), Some(ids)) = (self.order.batch_task(batch_idx), self.order.batch(batch_idx))
        else {
            return Err(DatasetError::IndexOutOfRange {
                index: batch_idx,
                len: self.batch_count(),
            });
        };
        let samples = ids
            .iter()
            .map(|&id| self.record_by_id(id)?.materialize(self.split))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TaskBatch {
            task: task.to_string(),
            samples,
        })
    }

    /// Iterate materialized batches in epoch order.
    pub fn iter_batches(&self) -> impl Iterator<Item = Result<TaskBatch, DatasetError>> + '_ {
        (0..self.batch_count()).map(move |batch_idx| self.batch(batch_idx))
    }
}
