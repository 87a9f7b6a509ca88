//! Task-homogeneous epoch planning.
//!
//! A plan shuffles each task bucket, cuts it into full batches, drops the
//! partial tail, shuffles the batches across tasks, and flattens them into one
//! id sequence. Every aligned `batch_size` window of the result belongs to a
//! single task.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::aggregate::TaskBuckets;
use crate::errors::DatasetError;
use crate::hash::stable_hash_ids;
use crate::types::{CanonicalTaskName, RecordId};

/// Per-task accounting produced while planning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskPlanStats {
    /// Canonical task name.
    pub task: CanonicalTaskName,
    /// Ids available in the bucket.
    pub available: usize,
    /// Full batches cut from the bucket.
    pub batches: usize,
    /// Ids left out because they could not fill a batch.
    pub dropped: usize,
}

/// Flattened id sequence defining one epoch's iteration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpochOrder {
    ids: Vec<RecordId>,
    batch_size: usize,
    batch_tasks: Vec<CanonicalTaskName>,
    stats: Vec<TaskPlanStats>,
}

impl EpochOrder {
    /// Number of ids in the order (always a multiple of `batch_size`).
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no task filled a single batch.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id at position `index`.
    pub fn get(&self, index: usize) -> Option<RecordId> {
        self.ids.get(index).copied()
    }

    /// Flattened ids.
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// Batch size the order was planned for.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of full batches.
    pub fn batch_count(&self) -> usize {
        self.batch_tasks.len()
    }

    /// Ids of batch `batch_idx`.
    pub fn batch(&self, batch_idx: usize) -> Option<&[RecordId]> {
        let start = batch_idx.checked_mul(self.batch_size)?;
        let end = start.checked_add(self.batch_size)?;
        self.ids.get(start..end)
    }

    /// Task that produced batch `batch_idx`.
    pub fn batch_task(&self, batch_idx: usize) -> Option<&str> {
        self.batch_tasks.get(batch_idx).map(String::as_str)
    }

    /// Iterate `(task, ids)` per batch in epoch order.
    pub fn batches(&self) -> impl Iterator<Item = (&str, &[RecordId])> {
        self.batch_tasks
            .iter()
            .map(String::as_str)
            .zip(self.ids.chunks_exact(self.batch_size))
    }

    /// Per-task accounting in bucket order.
    pub fn stats(&self) -> &[TaskPlanStats] {
        &self.stats
    }

    /// Hash of the order, handy for comparing runs in logs.
    pub fn fingerprint(&self) -> u64 {
        stable_hash_ids(self.batch_size, &self.ids)
    }
}

/// Plan one epoch over `buckets`.
///
/// `rng` drives both the optional per-task shuffle and the batch-order
/// shuffle; it is not retained. Empty buckets contribute no batches. Fails
/// with [`DatasetError::InvalidBatchSize`] when `batch_size` is zero.
pub fn plan<R>(
    buckets: TaskBuckets,
    batch_size: usize,
    shuffle_within_task: bool,
    rng: &mut R,
) -> Result<EpochOrder, DatasetError>
where
    R: Rng + ?Sized,
{
    if batch_size == 0 {
        return Err(DatasetError::InvalidBatchSize(batch_size));
    }
    info!(
        batch_size,
        tasks = buckets.len(),
        "[taskbatch:epoch] batching tasks for effective batch size"
    );

    let mut chunks: Vec<(usize, Vec<RecordId>)> = Vec::new();
    let mut stats = Vec::with_capacity(buckets.len());
    for (task_idx, (task, mut ids)) in buckets.into_inner().into_iter().enumerate() {
        if shuffle_within_task {
            ids.shuffle(rng);
        }
        let available = ids.len();
        let mut batches = 0;
        for chunk in ids.chunks(batch_size) {
            if chunk.len() == batch_size {
                chunks.push((task_idx, chunk.to_vec()));
                batches += 1;
            } else {
                info!(
                    task = %task,
                    size = chunk.len(),
                    "[taskbatch:epoch] skip 1 partial batch"
                );
            }
        }
        let dropped = available - batches * batch_size;
        debug!(task = %task, available, batches, dropped, "[taskbatch:epoch] task planned");
        stats.push(TaskPlanStats {
            task,
            available,
            batches,
            dropped,
        });
    }

    chunks.shuffle(rng);

    let mut ids = Vec::with_capacity(chunks.len() * batch_size);
    let mut batch_tasks = Vec::with_capacity(chunks.len());
    for (task_idx, chunk) in chunks {
        batch_tasks.push(stats[task_idx].task.clone());
        ids.extend(chunk);
    }
    info!(
        samples = ids.len(),
        batches = batch_tasks.len(),
        "[taskbatch:epoch] epoch order planned"
    );
    Ok(EpochOrder {
        ids,
        batch_size,
        batch_tasks,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::DeterministicRng;
    use indexmap::IndexMap;
    use std::collections::HashSet;

    fn buckets(pairs: &[(&str, std::ops::Range<RecordId>)]) -> TaskBuckets {
        let mut map = IndexMap::new();
        for (task, range) in pairs {
            map.insert(task.to_string(), range.clone().collect());
        }
        TaskBuckets::from_canonical(map)
    }

    #[test]
    fn drops_partial_tail() {
        let mut rng = DeterministicRng::new(3);
        let order = plan(buckets(&[("nq", 0..35)]), 10, true, &mut rng).unwrap();
        assert_eq!(order.len(), 30);
        assert_eq!(order.batch_count(), 3);
        assert_eq!(order.stats()[0].dropped, 5);
        assert_eq!(order.stats()[0].batches, 3);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut rng = DeterministicRng::new(3);
        let err = plan(buckets(&[("nq", 0..4)]), 0, true, &mut rng).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidBatchSize(0)));
    }

    #[test]
    fn empty_buckets_contribute_nothing() {
        let mut rng = DeterministicRng::new(3);
        let order = plan(
            buckets(&[("empty", 0..0), ("small", 0..3), ("full", 10..14)]),
            4,
            true,
            &mut rng,
        )
        .unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order.batch_task(0), Some("full"));
        assert_eq!(order.stats().len(), 3);
        assert_eq!(order.stats()[0].available, 0);
    }

    #[test]
    fn batches_are_task_homogeneous() {
        let mut rng = DeterministicRng::new(11);
        let order = plan(
            buckets(&[("a", 0..50), ("b", 100..137), ("c", 200..208)]),
            8,
            true,
            &mut rng,
        )
        .unwrap();
        for (task, ids) in order.batches() {
            let base = match task {
                "a" => 0..50,
                "b" => 100..137,
                "c" => 200..208,
                other => panic!("unexpected task {other}"),
            };
            assert!(ids.iter().all(|id| base.contains(id)));
        }
        let unique: HashSet<_> = order.ids().iter().collect();
        assert_eq!(unique.len(), order.len());
        assert_eq!(order.len(), 8 * (6 + 4 + 1));
    }

    #[test]
    fn unshuffled_tasks_keep_bucket_order_inside_batches() {
        let mut rng = DeterministicRng::new(5);
        let order = plan(buckets(&[("a", 0..6), ("b", 10..16)]), 3, false, &mut rng).unwrap();
        for (_, ids) in order.batches() {
            assert!(ids.windows(2).all(|pair| pair[1] == pair[0] + 1));
        }
    }

    #[test]
    fn batch_accessors_are_bounds_checked() {
        let mut rng = DeterministicRng::new(5);
        let order = plan(buckets(&[("a", 0..4)]), 2, true, &mut rng).unwrap();
        assert!(order.batch(1).is_some());
        assert!(order.batch(2).is_none());
        assert!(order.batch_task(2).is_none());
        assert!(order.get(4).is_none());
        assert!(order.batch(usize::MAX).is_none());
        assert!(order.batch(usize::MAX / 2 + 1).is_none());
    }

    #[test]
    fn huge_batch_index_with_unit_batches_is_none() {
        let mut rng = DeterministicRng::new(5);
        let order = plan(buckets(&[("a", 0..1)]), 1, true, &mut rng).unwrap();
        assert_eq!(order.batch(0), Some(&[0][..]));
        assert!(order.batch(usize::MAX).is_none());
    }

    #[test]
    fn shuffled_tasks_break_input_order_inside_batches() {
        let mut rng = DeterministicRng::new(5);
        let order = plan(buckets(&[("a", 0..64)]), 8, true, &mut rng).unwrap();
        let consecutive = order
            .batches()
            .filter(|(_, ids)| ids.windows(2).all(|pair| pair[1] == pair[0] + 1))
            .count();
        assert!(consecutive < order.batch_count());
    }

    #[test]
    fn same_seed_gives_same_fingerprint() {
        let make = |seed| {
            let mut rng = DeterministicRng::new(seed);
            plan(buckets(&[("a", 0..64), ("b", 64..128)]), 4, true, &mut rng).unwrap()
        };
        assert_eq!(make(1), make(1));
        assert_eq!(make(1).fingerprint(), make(1).fingerprint());
        assert_ne!(make(1).ids(), make(2).ids());
    }
}
