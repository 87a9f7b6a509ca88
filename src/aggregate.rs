//! Merging of shard variants into canonical task buckets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::aggregate::{DEFAULT_SHARD_SUFFIXES, IMPLICIT_TASK_NAME};
use crate::data::Record;
use crate::errors::DatasetError;
use crate::types::{CanonicalTaskName, RecordId, TaskName};

/// Configured suffixes marking separately sourced shards of one task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSuffixes(Vec<String>);

impl Default for ShardSuffixes {
    fn default() -> Self {
        Self::new(DEFAULT_SHARD_SUFFIXES)
    }
}

impl ShardSuffixes {
    /// Build from an explicit suffix list.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            suffixes
                .into_iter()
                .map(Into::into)
                .filter(|suffix: &String| !suffix.is_empty())
                .collect(),
        )
    }

    /// No suffixes: every task name is already canonical.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Configured suffixes.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Name with a terminal shard suffix stripped, or `None` when `name`
    /// does not end in a configured suffix (or would become empty).
    pub fn canonical_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.0
            .iter()
            .filter_map(|suffix| name.strip_suffix(suffix.as_str()))
            .find(|stem| !stem.is_empty())
    }

    /// Suffix found in `name` anywhere other than its tail.
    pub fn ambiguous_suffix(&self, name: &str) -> Option<&str> {
        let stem = self.canonical_name(name).unwrap_or(name);
        self.0
            .iter()
            .find(|suffix| stem.contains(suffix.as_str()))
            .map(String::as_str)
    }
}

/// Canonical task buckets of record ids, in first-encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    buckets: IndexMap<CanonicalTaskName, Vec<RecordId>>,
    ambiguous: Vec<TaskName>,
}

impl TaskBuckets {
    /// Wrap already-canonical buckets.
    pub fn from_canonical(buckets: IndexMap<CanonicalTaskName, Vec<RecordId>>) -> Self {
        Self {
            buckets,
            ambiguous: Vec::new(),
        }
    }

    /// Ids of `task`, if present.
    pub fn get(&self, task: &str) -> Option<&[RecordId]> {
        self.buckets.get(task).map(Vec::as_slice)
    }

    /// Iterate `(task, ids)` in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalTaskName, &[RecordId])> {
        self.buckets.iter().map(|(task, ids)| (task, ids.as_slice()))
    }

    /// Number of canonical tasks.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True when no task was aggregated.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of ids across all buckets.
    pub fn total_ids(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Names that contained a shard suffix outside their tail and were kept unmerged.
    pub fn ambiguous(&self) -> &[TaskName] {
        &self.ambiguous
    }

    /// Consume into the underlying bucket map.
    pub fn into_inner(self) -> IndexMap<CanonicalTaskName, Vec<RecordId>> {
        self.buckets
    }
}

/// Group loaded records into per-task id buckets, preserving load order.
///
/// Records without a task tag land in the implicit bucket.
pub fn group_by_task(records: &[Record]) -> IndexMap<TaskName, Vec<RecordId>> {
    let mut buckets: IndexMap<TaskName, Vec<RecordId>> = IndexMap::new();
    for record in records {
        let task = record.task_name.as_deref().unwrap_or(IMPLICIT_TASK_NAME);
        if let Some(ids) = buckets.get_mut(task) {
            ids.push(record.id);
        } else {
            buckets.insert(task.to_string(), vec![record.id]);
        }
    }
    buckets
}

/// Merge shard variants into canonical buckets.
///
/// Each variant's ids are appended to its canonical bucket in the order the
/// variants are encountered. Names with a suffix outside their tail are kept
/// as their own bucket and reported via [`TaskBuckets::ambiguous`].
pub fn aggregate<I>(buckets: I, suffixes: &ShardSuffixes) -> TaskBuckets
where
    I: IntoIterator<Item = (TaskName, Vec<RecordId>)>,
{
    let mut merged: IndexMap<CanonicalTaskName, Vec<RecordId>> = IndexMap::new();
    let mut ambiguous = Vec::new();
    for (task, ids) in buckets {
        let canonical = if let Some(suffix) = suffixes.ambiguous_suffix(&task) {
            warn!(
                task = %task,
                suffix,
                "[taskbatch:aggregate] shard suffix outside name tail; keeping task unmerged"
            );
            ambiguous.push(task.clone());
            task
        } else {
            suffixes
                .canonical_name(&task)
                .map(str::to_string)
                .unwrap_or(task)
        };
        merged.entry(canonical).or_default().extend(ids);
    }
    TaskBuckets {
        buckets: merged,
        ambiguous,
    }
}

/// Like [`aggregate`], but any ambiguous name fails with
/// [`DatasetError::AmbiguousTaskName`].
pub fn aggregate_strict<I>(buckets: I, suffixes: &ShardSuffixes) -> Result<TaskBuckets, DatasetError>
where
    I: IntoIterator<Item = (TaskName, Vec<RecordId>)>,
{
    let mut checked = Vec::new();
    for (task, ids) in buckets {
        if let Some(suffix) = suffixes.ambiguous_suffix(&task) {
            return Err(DatasetError::AmbiguousTaskName {
                suffix: suffix.to_string(),
                name: task,
            });
        }
        checked.push((task, ids));
    }
    Ok(aggregate(checked, suffixes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &[RecordId])]) -> Vec<(TaskName, Vec<RecordId>)> {
        pairs
            .iter()
            .map(|(task, ids)| (task.to_string(), ids.to_vec()))
            .collect()
    }

    #[test]
    fn merges_split_variants_in_encounter_order() {
        let merged = aggregate(
            input(&[("taskA_split1", &[1, 2]), ("taskA_split2", &[3, 4])]),
            &ShardSuffixes::default(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("taskA"), Some(&[1, 2, 3, 4][..]));
        assert!(merged.ambiguous().is_empty());
    }

    #[test]
    fn keeps_unrelated_tasks_and_order() {
        let merged = aggregate(
            input(&[
                ("nq", &[0]),
                ("quora_split2", &[1]),
                ("fever", &[2, 3]),
                ("quora_split1", &[4]),
            ]),
            &ShardSuffixes::default(),
        );
        let order: Vec<_> = merged.iter().map(|(task, _)| task.as_str()).collect();
        assert_eq!(order, vec!["nq", "quora", "fever"]);
        assert_eq!(merged.get("quora"), Some(&[1, 4][..]));
        assert_eq!(merged.total_ids(), 5);
    }

    #[test]
    fn merges_plain_name_with_its_shards() {
        let merged = aggregate(
            input(&[("squad", &[0, 1]), ("squad_split1", &[2])]),
            &ShardSuffixes::default(),
        );
        assert_eq!(merged.get("squad"), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn flags_suffix_outside_tail() {
        let merged = aggregate(
            input(&[("qa_split1_extra", &[5]), ("qa_split1", &[6])]),
            &ShardSuffixes::default(),
        );
        assert_eq!(merged.ambiguous(), &["qa_split1_extra".to_string()]);
        assert_eq!(merged.get("qa_split1_extra"), Some(&[5][..]));
        assert_eq!(merged.get("qa"), Some(&[6][..]));
    }

    #[test]
    fn strict_aggregation_rejects_ambiguous_names() {
        let err = aggregate_strict(
            input(&[("x_split2_split1", &[1])]),
            &ShardSuffixes::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::AmbiguousTaskName { ref name, .. } if name == "x_split2_split1"
        ));
    }

    #[test]
    fn suffix_alone_is_not_stripped_to_empty() {
        let suffixes = ShardSuffixes::default();
        assert_eq!(suffixes.canonical_name("_split1"), None);
        let merged = aggregate(input(&[("_split1", &[9])]), &suffixes);
        assert_eq!(merged.get("_split1"), Some(&[9][..]));
    }

    #[test]
    fn custom_suffixes_replace_defaults() {
        let suffixes = ShardSuffixes::new(["-a", "-b"]);
        let merged = aggregate(
            input(&[("nli-a", &[1]), ("nli-b", &[2]), ("nli_split1", &[3])]),
            &suffixes,
        );
        assert_eq!(merged.get("nli"), Some(&[1, 2][..]));
        assert_eq!(merged.get("nli_split1"), Some(&[3][..]));
        assert!(ShardSuffixes::none().canonical_name("nli_split1").is_none());
    }

    #[test]
    fn groups_records_by_task_with_implicit_bucket() {
        let record = |id, task: Option<&str>| Record {
            id,
            query: String::new(),
            positive: String::new(),
            negative: None,
            task_name: task.map(str::to_string),
        };
        let grouped = group_by_task(&[
            record(0, Some("nq")),
            record(1, None),
            record(2, Some("nq")),
        ]);
        assert_eq!(grouped.get("nq"), Some(&vec![0, 2]));
        assert_eq!(grouped.get(IMPLICIT_TASK_NAME), Some(&vec![1]));
    }
}
