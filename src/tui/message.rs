use std::time::Duration;

use crossterm::event::KeyEvent;

use crate::io::client::{RepoError, TaskPatch, TaskQuery};
use crate::io::events::PushEvent;
use crate::model::{Project, Task};

/// Everything the dispatcher can receive. Processed one at a time, in
/// arrival order.
#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Paste(String),
    Resize { width: u16, height: u16 },
    /// Terminal events with no meaning to the core (mouse, focus)
    Ignored,
    /// The poll timer fired
    Tick,
    TasksLoaded {
        seq: u64,
        result: Result<Vec<Task>, RepoError>,
    },
    ProjectsLoaded {
        result: Result<Vec<Project>, RepoError>,
    },
    TaskUpdated {
        seq: u64,
        id: String,
        result: Result<Task, RepoError>,
    },
    TaskDeleted {
        seq: u64,
        id: String,
        result: Result<(), RepoError>,
    },
    Push(PushEvent),
    /// The push source hung up; stop listening
    PushClosed,
    Copied {
        label: &'static str,
        result: Result<(), String>,
    },
}

/// A deferred unit of work. Runs off the dispatcher thread and yields exactly
/// one `Msg` (see `worker::execute`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// → `Msg::TasksLoaded`
    FetchTasks { seq: u64, query: TaskQuery },
    /// → `Msg::ProjectsLoaded`
    FetchProjects,
    /// → `Msg::TaskUpdated`
    UpdateTask {
        seq: u64,
        id: String,
        patch: TaskPatch,
    },
    /// → `Msg::TaskDeleted`
    DeleteTask { seq: u64, id: String },
    /// → `Msg::Tick` after the delay
    ScheduleTick { after: Duration },
    /// → `Msg::Push` or `Msg::PushClosed`
    ListenPush,
    /// → `Msg::Copied`
    CopyToClipboard { label: &'static str, text: String },
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::FetchTasks { .. } => "fetch_tasks",
            Command::FetchProjects => "fetch_projects",
            Command::UpdateTask { .. } => "update_task",
            Command::DeleteTask { .. } => "delete_task",
            Command::ScheduleTick { .. } => "schedule_tick",
            Command::ListenPush => "listen_push",
            Command::CopyToClipboard { .. } => "copy_to_clipboard",
        }
    }
}
