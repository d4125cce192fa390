use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of a task on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Doing,
    Review,
    Done,
}

impl TaskStatus {
    /// All statuses in workflow order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::Doing,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// Short label for list rows
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::Doing => "DOING",
            TaskStatus::Review => "REVIEW",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Some(TaskStatus::Todo),
            "doing" => Some(TaskStatus::Doing),
            "review" => Some(TaskStatus::Review),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as mirrored from the server.
///
/// The core treats tasks as immutable snapshot members: a refresh replaces the
/// whole set, and only the optimistic edit path in `ops::reconcile` touches
/// individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    /// Higher values sort first
    #[serde(default, alias = "task_order")]
    pub priority: i64,
    /// Feature tag used by the feature filter
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "epoch")]
    pub updated_at: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Task {
    /// Create a task with the given fields and empty optional metadata
    pub fn new(id: &str, project_id: &str, title: &str, status: TaskStatus, priority: i64) -> Self {
        Task {
            id: id.to_string(),
            project_id: project_id.to_string(),
            title: title.to_string(),
            description: String::new(),
            status,
            priority,
            feature: None,
            assignee: None,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    pub fn with_feature(mut self, feature: &str) -> Self {
        self.feature = Some(feature.to_string());
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self.updated_at = at;
        self
    }
}
