use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::task::TaskStatus;

/// How the visible task list is ordered. Cycles in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Group by status rank, priority descending within a group
    #[default]
    StatusPriority,
    /// Priority descending
    Priority,
    /// Newest first
    Created,
    /// Case-insensitive title
    Alphabetical,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::StatusPriority,
        SortMode::Priority,
        SortMode::Created,
        SortMode::Alphabetical,
    ];

    fn position(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    pub fn next(self) -> SortMode {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> SortMode {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::StatusPriority => "status",
            SortMode::Priority => "priority",
            SortMode::Created => "created",
            SortMode::Alphabetical => "a-z",
        }
    }

    pub fn parse(s: &str) -> Option<SortMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" | "status-priority" => Some(SortMode::StatusPriority),
            "priority" => Some(SortMode::Priority),
            "created" | "creation" => Some(SortMode::Created),
            "alpha" | "alphabetical" | "a-z" | "title" => Some(SortMode::Alphabetical),
            _ => None,
        }
    }
}

/// Per-status visibility map. Every status is visible by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFilter {
    #[serde(default = "default_true")]
    pub todo: bool,
    #[serde(default = "default_true")]
    pub doing: bool,
    #[serde(default = "default_true")]
    pub review: bool,
    #[serde(default = "default_true")]
    pub done: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter {
            todo: true,
            doing: true,
            review: true,
            done: true,
        }
    }
}

impl StatusFilter {
    fn slot(&mut self, status: TaskStatus) -> &mut bool {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::Doing => &mut self.doing,
            TaskStatus::Review => &mut self.review,
            TaskStatus::Done => &mut self.done,
        }
    }

    pub fn is_visible(&self, status: TaskStatus) -> bool {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::Doing => self.doing,
            TaskStatus::Review => self.review,
            TaskStatus::Done => self.done,
        }
    }

    pub fn set(&mut self, status: TaskStatus, visible: bool) {
        *self.slot(status) = visible;
    }

    pub fn toggle(&mut self, status: TaskStatus) {
        let slot = self.slot(status);
        *slot = !*slot;
    }

    pub fn all_visible(&self) -> bool {
        TaskStatus::ALL.iter().all(|s| self.is_visible(*s))
    }

    /// Statuses currently visible, in workflow order
    pub fn visible_statuses(&self) -> Vec<TaskStatus> {
        TaskStatus::ALL
            .iter()
            .copied()
            .filter(|s| self.is_visible(*s))
            .collect()
    }
}

/// Feature visibility map: tag → shown. Insertion order is display order.
pub type FeatureFilter = IndexMap<String, bool>;

/// Whether a task's feature tag passes an optional feature filter.
///
/// No filter passes everything. With a filter, only tagged tasks whose tag is
/// mapped to `true` pass.
pub fn feature_passes(filter: Option<&FeatureFilter>, feature: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(map) => feature.is_some_and(|tag| map.get(tag).copied().unwrap_or(false)),
    }
}

/// Rank order of statuses for the status-then-priority sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TaskStatus>", into = "Vec<TaskStatus>")]
pub struct StatusOrder(Vec<TaskStatus>);

impl Default for StatusOrder {
    fn default() -> Self {
        StatusOrder(vec![
            TaskStatus::Doing,
            TaskStatus::Review,
            TaskStatus::Todo,
            TaskStatus::Done,
        ])
    }
}

impl From<Vec<TaskStatus>> for StatusOrder {
    /// Duplicates are dropped and missing statuses are appended in workflow order,
    /// so every status always has a rank.
    fn from(list: Vec<TaskStatus>) -> Self {
        let mut order: Vec<TaskStatus> = Vec::with_capacity(TaskStatus::ALL.len());
        for status in list.into_iter().chain(TaskStatus::ALL) {
            if !order.contains(&status) {
                order.push(status);
            }
        }
        StatusOrder(order)
    }
}

impl From<StatusOrder> for Vec<TaskStatus> {
    fn from(order: StatusOrder) -> Self {
        order.0
    }
}

impl StatusOrder {
    pub fn rank(&self, status: TaskStatus) -> usize {
        self.0
            .iter()
            .position(|s| *s == status)
            .unwrap_or(self.0.len())
    }

    pub fn statuses(&self) -> &[TaskStatus] {
        &self.0
    }
}
