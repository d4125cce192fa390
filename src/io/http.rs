use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::io::client::{RepoError, Repository, TaskPatch, TaskQuery};
use crate::model::{Project, Task};

/// Repository backed by the task server's JSON API.
pub struct HttpRepository {
    base_url: String,
    client: Client,
}

/// Listing endpoints answer either with a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskList {
    Wrapped { tasks: Vec<Task> },
    Bare(Vec<Task>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectList {
    Wrapped { projects: Vec<Project> },
    Bare(Vec<Project>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TaskBody {
    Wrapped { task: Task },
    Bare(Task),
}

impl HttpRepository {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RepoError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RepoError::Transport(e.to_string()))?;
        Ok(HttpRepository {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Map a non-success response to a `RepoError`, reading the body as the message.
fn check(response: Response, id: Option<&str>) -> Result<Response, RepoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND
        && let Some(id) = id
    {
        return Err(RepoError::NotFound(id.to_string()));
    }
    let message = response
        .text()
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
    Err(RepoError::Status {
        status: status.as_u16(),
        message,
    })
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RepoError> {
    response
        .json::<T>()
        .map_err(|e| RepoError::Decode(e.to_string()))
}

fn transport(err: reqwest::Error) -> RepoError {
    RepoError::Transport(err.to_string())
}

impl Repository for HttpRepository {
    fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, RepoError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(project_id) = &query.project_id {
            params.push(("project_id", project_id.clone()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        params.push(("include_closed", query.include_closed.to_string()));

        let response = self
            .client
            .get(self.url("/api/tasks"))
            .query(&params)
            .send()
            .map_err(transport)?;
        let list: TaskList = decode(check(response, None)?)?;
        Ok(match list {
            TaskList::Wrapped { tasks } | TaskList::Bare(tasks) => tasks,
        })
    }

    fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, RepoError> {
        let response = self
            .client
            .put(self.url(&format!("/api/tasks/{}", id)))
            .json(patch)
            .send()
            .map_err(transport)?;
        let body: TaskBody = decode(check(response, Some(id))?)?;
        Ok(match body {
            TaskBody::Wrapped { task } | TaskBody::Bare(task) => task,
        })
    }

    fn delete_task(&self, id: &str) -> Result<(), RepoError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .send()
            .map_err(transport)?;
        check(response, Some(id))?;
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RepoError> {
        let response = self
            .client
            .get(self.url("/api/projects"))
            .send()
            .map_err(transport)?;
        let list: ProjectList = decode(check(response, None)?)?;
        Ok(match list {
            ProjectList::Wrapped { projects } | ProjectList::Bare(projects) => projects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let repo = HttpRepository::new("http://localhost:8181/", Duration::from_secs(1)).unwrap();
        assert_eq!(repo.base_url(), "http://localhost:8181");
        assert_eq!(repo.url("/api/tasks"), "http://localhost:8181/api/tasks");
    }

    #[test]
    fn task_list_accepts_both_shapes() {
        let wrapped = r#"{"tasks":[{"id":"t1","title":"A","status":"todo","task_order":3}]}"#;
        let bare = r#"[{"id":"t1","title":"A","status":"doing","priority":3,"feature":"ui"}]"#;
        let TaskList::Wrapped { tasks } = serde_json::from_str(wrapped).unwrap() else {
            panic!("expected wrapped list");
        };
        assert_eq!(tasks[0].priority, 3);
        let TaskList::Bare(tasks) = serde_json::from_str(bare).unwrap() else {
            panic!("expected bare list");
        };
        assert_eq!(tasks[0].feature.as_deref(), Some("ui"));
    }

    #[test]
    fn unreachable_server_is_transport_error() {
        let repo = HttpRepository::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let err = repo.list_projects().unwrap_err();
        assert!(matches!(err, RepoError::Transport(_)), "unexpected error: {err:?}");
    }
}
