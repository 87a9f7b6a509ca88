use indexmap::IndexMap;

use crate::epoch::EpochOrder;
use crate::types::CanonicalTaskName;

/// Aggregate skew metrics for per-task batch counts.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskSkew {
    pub total: usize,
    pub tasks: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub max_share: f64,
    pub min_share: f64,
    pub ratio: f64,
    pub per_task: Vec<TaskShare>,
}

/// Per-task share of an epoch's batches.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskShare {
    pub task: CanonicalTaskName,
    pub batches: usize,
    pub dropped: usize,
    pub share: f64,
}

/// Compute batch-count skew across the tasks of `order`.
///
/// Tasks that filled no batch count as zero. Returns `None` when the order
/// was planned over no tasks.
pub fn task_skew(order: &EpochOrder) -> Option<TaskSkew> {
    let mut counts: IndexMap<&str, (usize, usize)> = order
        .stats()
        .iter()
        .map(|stats| (stats.task.as_str(), (0, stats.dropped)))
        .collect();
    for (task, _) in order.batches() {
        counts.entry(task).or_default().0 += 1;
    }
    let min = counts.values().map(|(batches, _)| *batches).min()?;
    let max = counts.values().map(|(batches, _)| *batches).max()?;
    let total: usize = counts.values().map(|(batches, _)| batches).sum();
    let tasks = counts.len();
    let share_of = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    };
    let ratio = if min == 0 {
        f64::INFINITY
    } else {
        max as f64 / min as f64
    };
    let mut per_task: Vec<TaskShare> = counts
        .iter()
        .map(|(task, (batches, dropped))| TaskShare {
            task: task.to_string(),
            batches: *batches,
            dropped: *dropped,
            share: share_of(*batches),
        })
        .collect();
    per_task.sort_by(|a, b| b.batches.cmp(&a.batches).then_with(|| a.task.cmp(&b.task)));
    Some(TaskSkew {
        total,
        tasks,
        min,
        max,
        mean: total as f64 / tasks as f64,
        max_share: share_of(max),
        min_share: share_of(min),
        ratio,
        per_task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::TaskBuckets;
    use crate::epoch::plan;
    use crate::rng::DeterministicRng;

    fn order(sizes: &[(&str, usize)], batch_size: usize) -> EpochOrder {
        let mut map = IndexMap::new();
        let mut next = 0;
        for (task, size) in sizes {
            map.insert(task.to_string(), (next..next + size).collect());
            next += size;
        }
        let mut rng = DeterministicRng::new(9);
        plan(TaskBuckets::from_canonical(map), batch_size, true, &mut rng).unwrap()
    }

    #[test]
    fn task_skew_reports_balance() {
        let skew = task_skew(&order(&[("a", 4), ("b", 4)], 2)).expect("skew");
        assert_eq!(skew.total, 4);
        assert_eq!(skew.tasks, 2);
        assert_eq!(skew.min, 2);
        assert_eq!(skew.max, 2);
        assert!((skew.max_share - 0.5).abs() < 1e-6);
        assert!((skew.ratio - 1.0).abs() < 1e-6);
        assert!(
            skew.per_task
                .iter()
                .all(|entry| (entry.share - 0.5).abs() < 1e-6)
        );
    }

    #[test]
    fn task_skew_reports_imbalance_and_drops() {
        let skew = task_skew(&order(&[("a", 9), ("b", 4), ("c", 5)], 2)).expect("skew");
        assert_eq!(skew.total, 8);
        assert_eq!(skew.tasks, 3);
        assert_eq!(skew.min, 2);
        assert_eq!(skew.max, 4);
        assert!((skew.ratio - 2.0).abs() < 1e-6);
        assert_eq!(skew.per_task[0].task, "a");
        assert_eq!(skew.per_task[0].batches, 4);
        assert_eq!(skew.per_task[0].dropped, 1);
    }

    #[test]
    fn tasks_without_batches_make_ratio_infinite() {
        let skew = task_skew(&order(&[("a", 4), ("tiny", 1)], 2)).expect("skew");
        assert_eq!(skew.min, 0);
        assert!(skew.ratio.is_infinite());
    }

    #[test]
    fn empty_plan_has_no_skew() {
        assert!(task_skew(&order(&[], 2)).is_none());
    }
}
