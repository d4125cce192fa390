use std::cmp::Ordering;

use crate::model::{FeatureFilter, SortMode, StatusFilter, StatusOrder, Task, feature_passes};

/// Everything that decides which tasks are visible and in what order
#[derive(Debug, Clone, Copy)]
pub struct ViewPrefs<'a> {
    /// Only this project's tasks; `None` shows all projects
    pub project: Option<&'a str>,
    pub statuses: &'a StatusFilter,
    pub features: Option<&'a FeatureFilter>,
    pub sort: SortMode,
    pub status_order: &'a StatusOrder,
}

/// Compute the visible list as indices into `tasks`.
///
/// Pure and deterministic: ties keep snapshot order, so re-running on the
/// same inputs always yields the same list.
pub fn visible_indices(tasks: &[Task], prefs: &ViewPrefs) -> Vec<usize> {
    let mut indices: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| passes_filters(t, prefs))
        .map(|(i, _)| i)
        .collect();
    indices.sort_by(|&a, &b| compare(&tasks[a], &tasks[b], prefs.sort, prefs.status_order));
    indices
}

fn passes_filters(task: &Task, prefs: &ViewPrefs) -> bool {
    if let Some(project) = prefs.project
        && task.project_id != project
    {
        return false;
    }
    prefs.statuses.is_visible(task.status)
        && feature_passes(prefs.features, task.feature.as_deref())
}

/// Ordering for a sort mode. `sort_by` is stable, so `Equal` keeps snapshot order.
pub fn compare(a: &Task, b: &Task, mode: SortMode, order: &StatusOrder) -> Ordering {
    match mode {
        SortMode::StatusPriority => order
            .rank(a.status)
            .cmp(&order.rank(b.status))
            .then_with(|| b.priority.cmp(&a.priority)),
        SortMode::Priority => b.priority.cmp(&a.priority),
        SortMode::Created => b.created_at.cmp(&a.created_at),
        SortMode::Alphabetical => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

/// Distinct feature tags in the snapshot, sorted
pub fn feature_tags(tasks: &[Task]) -> Vec<String> {
    let mut tags: Vec<String> = tasks.iter().filter_map(|t| t.feature.clone()).collect();
    tags.sort();
    tags.dedup();
    tags
}
