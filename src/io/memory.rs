use std::sync::Mutex;

use chrono::{Duration, TimeZone, Utc};

use crate::io::client::{RepoError, Repository, TaskPatch, TaskQuery};
use crate::model::{Project, Task, TaskStatus};

/// In-process repository used by `--demo` and by tests.
#[derive(Default)]
pub struct MemoryRepository {
    tasks: Mutex<Vec<Task>>,
    projects: Mutex<Vec<Project>>,
    /// When set, every call fails with this error
    failure: Mutex<Option<RepoError>>,
}

impl MemoryRepository {
    pub fn new(projects: Vec<Project>, tasks: Vec<Task>) -> Self {
        MemoryRepository {
            tasks: Mutex::new(tasks),
            projects: Mutex::new(projects),
            failure: Mutex::new(None),
        }
    }

    /// A small sample board across two projects
    pub fn demo() -> Self {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single().unwrap_or_default();
        let at = |days: i64| base + Duration::days(days);
        let projects = vec![
            Project::new("p-web", "Web client"),
            Project::new("p-api", "API server"),
        ];
        let tasks = vec![
            Task::new("T-101", "p-web", "Add authentication flow", TaskStatus::Doing, 80)
                .with_feature("auth")
                .created(at(0)),
            Task::new("T-102", "p-web", "Fix UI glitches in sidebar", TaskStatus::Todo, 40)
                .with_feature("ui")
                .created(at(1)),
            Task::new("T-103", "p-web", "OAuth refactor", TaskStatus::Review, 60)
                .with_feature("auth")
                .created(at(2)),
            Task::new("T-104", "p-web", "Dark mode palette", TaskStatus::Todo, 20)
                .with_feature("ui")
                .created(at(3)),
            Task::new("T-201", "p-api", "Paginate task listing", TaskStatus::Todo, 70)
                .with_feature("backend")
                .created(at(4)),
            Task::new("T-202", "p-api", "Rate limiter", TaskStatus::Done, 50)
                .with_feature("backend")
                .created(at(5)),
            Task::new("T-203", "p-api", "Write deployment notes", TaskStatus::Todo, 10)
                .created(at(6)),
        ];
        MemoryRepository::new(projects, tasks)
    }

    /// Make every following call fail with `err` (or succeed again with `None`)
    pub fn set_failure(&self, err: Option<RepoError>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = err;
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), RepoError> {
        match self.failure.lock() {
            Ok(failure) => match failure.as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            },
            Err(_) => Err(RepoError::Transport("repository lock poisoned".into())),
        }
    }
}

fn poisoned<T>(_: T) -> RepoError {
    RepoError::Transport("repository lock poisoned".into())
}

impl Repository for MemoryRepository {
    fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, RepoError> {
        self.check_failure()?;
        let tasks = self.tasks.lock().map_err(poisoned)?;
        Ok(tasks
            .iter()
            .filter(|t| query.project_id.as_ref().is_none_or(|p| &t.project_id == p))
            .filter(|t| query.status.is_none_or(|s| t.status == s))
            .filter(|t| query.include_closed || t.status != TaskStatus::Done)
            .cloned()
            .collect())
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, RepoError> {
        self.check_failure()?;
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;
        patch.apply(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    fn delete_task(&self, id: &str) -> Result<(), RepoError> {
        self.check_failure()?;
        let mut tasks = self.tasks.lock().map_err(poisoned)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepoError> {
        self.check_failure()?;
        let projects = self.projects.lock().map_err(poisoned)?;
        Ok(projects.clone())
    }
}
