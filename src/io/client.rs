use serde::Serialize;

use crate::model::{Project, StatusFilter, Task, TaskStatus};

/// Longest title the server accepts
pub const MAX_TITLE_LEN: usize = 255;
/// Longest feature tag the server accepts
pub const MAX_FEATURE_LEN: usize = 64;

/// Error type for repository calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("could not reach server: {0}")]
    Transport(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("task {0} not found")]
    NotFound(String),
    #[error("could not decode server response: {0}")]
    Decode(String),
}

/// Error type for updates rejected before any request is issued
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("nothing to update")]
    Empty,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("title is longer than {MAX_TITLE_LEN} characters")]
    TitleTooLong,
    #[error("priority must be a non-negative number")]
    NegativePriority,
    #[error("priority must be a number: {0:?}")]
    InvalidPriority(String),
    #[error("feature tag cannot contain whitespace")]
    FeatureWhitespace,
    #[error("feature tag is longer than {MAX_FEATURE_LEN} characters")]
    FeatureTooLong,
}

/// Server-side filter for a task listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub project_id: Option<String>,
    /// Restrict to a single status; `None` lists every status
    pub status: Option<TaskStatus>,
    pub include_closed: bool,
}

impl TaskQuery {
    /// The narrowest server query that still returns every task the
    /// status filter can show.
    pub fn for_view(project_id: Option<String>, statuses: &StatusFilter) -> Self {
        let visible = statuses.visible_statuses();
        TaskQuery {
            project_id,
            status: match visible.as_slice() {
                [only] => Some(*only),
                _ => None,
            },
            include_closed: statuses.is_visible(TaskStatus::Done),
        }
    }
}

/// A partial task update. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "task_order")]
    pub priority: Option<i64>,
    /// `Some(None)` clears the tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<Option<String>>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        TaskPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.feature.is_none()
    }

    /// Reject malformed updates locally
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::Empty);
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle);
            }
            if title.chars().count() > MAX_TITLE_LEN {
                return Err(ValidationError::TitleTooLong);
            }
        }
        if let Some(priority) = self.priority
            && priority < 0
        {
            return Err(ValidationError::NegativePriority);
        }
        if let Some(Some(feature)) = &self.feature {
            if feature.chars().any(char::is_whitespace) {
                return Err(ValidationError::FeatureWhitespace);
            }
            if feature.chars().count() > MAX_FEATURE_LEN {
                return Err(ValidationError::FeatureTooLong);
            }
        }
        Ok(())
    }

    /// Apply this patch to a local copy of a task
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(feature) = &self.feature {
            task.feature = feature.clone();
        }
    }
}

/// The server-side task store. Every call may block; the TUI only ever calls
/// these from worker threads.
pub trait Repository: Send + Sync {
    fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, RepoError>;
    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, RepoError>;
    fn delete_task(&self, id: &str) -> Result<(), RepoError>;
    fn list_projects(&self) -> Result<Vec<Project>, RepoError>;
}
