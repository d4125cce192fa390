use serde::Serialize;

use crate::model::{Project, Task, TaskStatus};
use crate::util::unicode::pad_to_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub project: String,
    pub title: String,
    pub status: TaskStatus,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub created: String,
    pub updated: String,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: String,
    pub title: String,
    pub tasks: usize,
}

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        project: task.project_id.clone(),
        title: task.title.clone(),
        status: task.status,
        priority: task.priority,
        feature: task.feature.clone(),
        assignee: task.assignee.clone(),
        created: task.created_at.to_rfc3339(),
        updated: task.updated_at.to_rfc3339(),
    }
}

pub fn project_to_json(project: &Project, tasks: &[Task]) -> ProjectJson {
    ProjectJson {
        id: project.id.clone(),
        title: project.title.clone(),
        tasks: count_tasks(project, tasks),
    }
}

fn count_tasks(project: &Project, tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.project_id == project.id).count()
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

const ID_WIDTH: usize = 8;
const STATUS_WIDTH: usize = 7;

/// One task per line: `ID  STATUS  PRI  title  #feature`
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "{}{}{:>3}  {}",
        pad_to_width(&task.id, ID_WIDTH),
        pad_to_width(task.status.label(), STATUS_WIDTH),
        task.priority,
        task.title
    );
    if let Some(feature) = &task.feature {
        line.push_str("  #");
        line.push_str(feature);
    }
    line
}

pub fn format_project_line(project: &Project, tasks: &[Task]) -> String {
    let count = count_tasks(project, tasks);
    let noun = if count == 1 { "task" } else { "tasks" };
    format!(
        "{}{}  ({} {})",
        pad_to_width(&project.id, ID_WIDTH),
        project.title,
        count,
        noun
    )
}
