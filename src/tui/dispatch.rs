//! The reducer: every state change in the session happens here, one message
//! at a time, and any slow follow-up work is returned as commands.

use tracing::{debug, info, warn};

use crate::io::client::{RepoError, TaskPatch};
use crate::io::events::PushEvent;
use crate::model::{Project, Task};
use crate::ops::reconcile::Change;
use crate::ops::selection;

use super::app::App;
use super::input;
use super::message::{Command, Msg};
use super::state::{Source, ViewMode};

/// Apply one message to the app and return the commands it produced
pub fn dispatch(app: &mut App, msg: Msg) -> Vec<Command> {
    match msg {
        Msg::Key(key) => input::handle_key(app, key),
        Msg::Paste(text) => {
            input::handle_paste(app, &text);
            Vec::new()
        }
        Msg::Resize { width, height } => {
            app.view.width = width;
            app.view.height = height;
            Vec::new()
        }
        Msg::Ignored => Vec::new(),
        Msg::Tick => on_tick(app),
        Msg::TasksLoaded { seq, result } => on_tasks_loaded(app, seq, result),
        Msg::ProjectsLoaded { result } => on_projects_loaded(app, result),
        Msg::TaskUpdated { seq, id, result } => on_task_updated(app, seq, &id, result),
        Msg::TaskDeleted { seq, id, result } => on_task_deleted(app, seq, &id, result),
        Msg::Push(event) => on_push(app, event),
        Msg::PushClosed => {
            warn!("push source closed; live updates stopped");
            app.push_enabled = false;
            Vec::new()
        }
        Msg::Copied { label, result } => {
            match result {
                Ok(()) => app.notify(format!("Copied {}", label)),
                Err(e) => {
                    warn!(label, error = %e, "clipboard copy failed");
                    app.domain.last_error = Some(format!("Copy failed: {}", e));
                }
            }
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Requests

/// Fetch fresh task and project snapshots
pub fn refresh(app: &mut App, message: &str) -> Vec<Command> {
    let seq = app.domain.next_seq();
    let query = app.domain.task_query();
    // One pending fetch for each command below
    app.domain.begin_fetch(message);
    app.domain.begin_fetch(message);
    debug!(seq, ?query, "refresh issued");
    vec![Command::FetchTasks { seq, query }, Command::FetchProjects]
}

/// Apply `patch` locally and send it to the server. Invalid patches are
/// rejected here and never leave the client.
pub fn update_task(app: &mut App, id: &str, patch: TaskPatch) -> Vec<Command> {
    if let Err(e) = patch.validate() {
        debug!(id, error = %e, "update rejected locally");
        app.domain.last_error = Some(e.to_string());
        return Vec::new();
    }
    let Some(before) = app.domain.task(id).cloned() else {
        debug!(id, "update for a task no longer in the snapshot");
        return Vec::new();
    };

    let seq = app.domain.next_seq();
    app.reflow(|app| {
        if let Some(task) = app.domain.tasks.iter_mut().find(|t| t.id == id) {
            patch.apply(task);
        }
    });
    app.domain
        .ledger
        .record(id, seq, Some(before), Change::Patch(patch.clone()));
    app.domain.begin_fetch("Saving");
    info!(id, seq, "task update issued");
    vec![Command::UpdateTask {
        seq,
        id: id.to_string(),
        patch,
    }]
}

/// Remove the task locally and ask the server to delete it
pub fn delete_task(app: &mut App, id: &str) -> Vec<Command> {
    let Some(before) = app.domain.task(id).cloned() else {
        return Vec::new();
    };
    let seq = app.domain.next_seq();
    app.reflow(|app| app.domain.tasks.retain(|t| t.id != id));
    app.domain
        .ledger
        .record(id, seq, Some(before), Change::Delete);
    app.domain.begin_fetch("Deleting");
    info!(id, seq, "task delete issued");
    vec![Command::DeleteTask {
        seq,
        id: id.to_string(),
    }]
}

/// Change a filter or the project scope. The visible list is recomputed at
/// once; when the server-side query changes as well, a refresh follows.
pub fn refilter(app: &mut App, mutate: impl FnOnce(&mut App)) -> Vec<Command> {
    let before = app.domain.task_query();
    app.reflow(mutate);
    if app.domain.task_query() != before {
        refresh(app, "Loading tasks")
    } else {
        Vec::new()
    }
}

/// Scope the list to one project (`None` = all) and return to the task list
pub fn select_project(app: &mut App, project: Option<String>) -> Vec<Command> {
    app.view.mode = ViewMode::Tasks;
    if app.domain.selected_project == project {
        return Vec::new();
    }
    info!(project = ?project, "project scope changed");
    refilter(app, |app| app.domain.selected_project = project)
}

// ---------------------------------------------------------------------------
// Results

fn on_tick(app: &mut App) -> Vec<Command> {
    if app.poll_interval.is_zero() {
        return Vec::new();
    }
    let mut commands = if app.domain.loading {
        debug!("poll skipped; a request is still in flight");
        Vec::new()
    } else {
        refresh(app, "Refreshing")
    };
    commands.push(Command::ScheduleTick {
        after: app.poll_interval,
    });
    commands
}

fn on_tasks_loaded(app: &mut App, seq: u64, result: Result<Vec<Task>, RepoError>) -> Vec<Command> {
    app.domain.end_fetch();
    if !app.domain.is_fresh(seq) {
        debug!(seq, "stale task snapshot discarded");
        return Vec::new();
    }
    match result {
        Ok(mut tasks) => {
            app.domain.mark_applied(seq);
            app.domain.ledger.rebase(&mut tasks, seq);
            let count = tasks.len();
            app.reflow(|app| app.domain.tasks = tasks);
            app.domain.loaded = true;
            mark_connected(app, Source::Tasks);
            info!(seq, count, "task snapshot applied");
        }
        Err(e) => record_failure(app, Source::Tasks, "task refresh", &e),
    }
    Vec::new()
}

fn on_projects_loaded(app: &mut App, result: Result<Vec<Project>, RepoError>) -> Vec<Command> {
    app.domain.end_fetch();
    match result {
        Ok(projects) => {
            debug!(count = projects.len(), "project snapshot applied");
            app.domain.projects = projects;
            app.view.project_cursor =
                selection::clamp(app.view.project_cursor, app.project_entries());
            mark_connected(app, Source::Projects);
        }
        Err(e) => record_failure(app, Source::Projects, "project refresh", &e),
    }
    Vec::new()
}

fn on_task_updated(
    app: &mut App,
    seq: u64,
    id: &str,
    result: Result<Task, RepoError>,
) -> Vec<Command> {
    app.domain.end_fetch();
    match result {
        Ok(server) => {
            let settled_at = app.domain.next_seq();
            app.reflow(|app| {
                let domain = &mut app.domain;
                if !domain
                    .ledger
                    .confirm_update(seq, server.clone(), settled_at, &mut domain.tasks)
                {
                    debug!(id, seq, "update result without a ledger entry");
                    if let Some(task) = domain.tasks.iter_mut().find(|t| t.id == id) {
                        *task = server;
                    }
                }
            });
            mark_connected(app, Source::Tasks);
            info!(id, seq, "task update confirmed");
            Vec::new()
        }
        Err(RepoError::NotFound(_)) => {
            info!(id, seq, "updated task no longer exists; refreshing");
            app.domain.ledger.forget(seq);
            app.reflow(|app| app.domain.tasks.retain(|t| t.id != id));
            refresh(app, "Refreshing")
        }
        Err(e) => {
            app.reflow(|app| {
                app.domain.ledger.roll_back(seq, &mut app.domain.tasks);
            });
            record_failure(app, Source::Tasks, "task update", &e);
            Vec::new()
        }
    }
}

fn on_task_deleted(
    app: &mut App,
    seq: u64,
    id: &str,
    result: Result<(), RepoError>,
) -> Vec<Command> {
    app.domain.end_fetch();
    match result {
        // Gone either way
        Ok(()) | Err(RepoError::NotFound(_)) => {
            let settled_at = app.domain.next_seq();
            app.domain.ledger.confirm_delete(seq, settled_at);
            mark_connected(app, Source::Tasks);
            info!(id, seq, "task delete confirmed");
        }
        Err(e) => {
            app.reflow(|app| {
                app.domain.ledger.roll_back(seq, &mut app.domain.tasks);
            });
            record_failure(app, Source::Tasks, "task delete", &e);
        }
    }
    Vec::new()
}

fn on_push(app: &mut App, event: PushEvent) -> Vec<Command> {
    // Keep listening whatever the event was
    let mut commands = vec![Command::ListenPush];
    match &event {
        PushEvent::Connected => {
            debug!("push source connected");
            app.domain.connected = true;
        }
        PushEvent::Disconnected => {
            debug!("push source disconnected");
            app.domain.connected = false;
        }
        _ => {}
    }
    if event.touches_tasks() {
        debug!(?event, "push event; refreshing");
        commands.extend(refresh(app, "Syncing"));
    }
    commands
}

/// A request succeeded: the server is reachable again, unless the other
/// source is still failing
fn mark_connected(app: &mut App, source: Source) {
    app.domain.record_success(source);
}

fn record_failure(app: &mut App, source: Source, what: &str, err: &RepoError) {
    warn!(error = %err, "{} failed", what);
    app.domain.record_failure(source, err.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppConfig, TaskStatus};
    use crate::tui::modal::{Modal, StatusEditState};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    fn app() -> App {
        App::new(&AppConfig::default(), false)
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new("a", "p", "Alpha", TaskStatus::Todo, 10),
            Task::new("b", "p", "Beta", TaskStatus::Doing, 20),
            Task::new("c", "p", "Gamma", TaskStatus::Todo, 30),
        ]
    }

    /// Issue a refresh and deliver `snapshot` as its result
    fn load(app: &mut App, snapshot: Vec<Task>) {
        let commands = refresh(app, "Loading");
        let Some(Command::FetchTasks { seq, .. }) = commands.first() else {
            panic!("refresh must start with a task fetch");
        };
        let seq = *seq;
        dispatch(app, Msg::TasksLoaded { seq, result: Ok(snapshot) });
        dispatch(app, Msg::ProjectsLoaded { result: Ok(vec![]) });
    }

    fn visible_ids(app: &App) -> Vec<String> {
        app.visible_tasks().map(|t| t.id.clone()).collect()
    }

    fn key(c: char) -> Msg {
        Msg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn refresh_applies_snapshot_and_clears_loading() {
        let mut app = app();
        load(&mut app, tasks());
        // Doing ranks first, then todo by priority descending
        assert_eq!(visible_ids(&app), vec!["b", "c", "a"]);
        assert!(!app.domain.loading);
        assert!(app.domain.connected);
        assert!(app.domain.loaded);
    }

    #[test]
    fn stale_snapshot_is_discarded() {
        let mut app = app();
        let old = refresh(&mut app, "one");
        let new = refresh(&mut app, "two");
        let (Some(Command::FetchTasks { seq: old_seq, .. }), Some(Command::FetchTasks { seq: new_seq, .. })) =
            (old.first(), new.first())
        else {
            panic!("expected task fetches");
        };
        dispatch(&mut app, Msg::TasksLoaded { seq: *new_seq, result: Ok(tasks()) });
        dispatch(&mut app, Msg::TasksLoaded { seq: *old_seq, result: Ok(vec![]) });
        assert_eq!(app.domain.tasks.len(), 3);
    }

    #[test]
    fn failed_refresh_keeps_snapshot_and_shows_error() {
        let mut app = app();
        load(&mut app, tasks());
        let commands = refresh(&mut app, "Refreshing");
        let Some(Command::FetchTasks { seq, .. }) = commands.first() else {
            panic!("expected task fetch");
        };
        dispatch(
            &mut app,
            Msg::TasksLoaded {
                seq: *seq,
                result: Err(RepoError::Transport("refused".into())),
            },
        );
        assert_eq!(app.domain.tasks.len(), 3);
        assert!(!app.domain.connected);
        assert!(app.domain.last_error.is_some());
    }

    #[test]
    fn selection_follows_task_across_refresh() {
        let mut app = app();
        load(&mut app, tasks());
        app.view.selected = 2; // "a"
        let mut next = tasks();
        next.insert(0, Task::new("z", "p", "Zeta", TaskStatus::Doing, 99));
        load(&mut app, next);
        assert_eq!(app.selected_id().as_deref(), Some("a"));
    }

    #[test]
    fn optimistic_update_then_rollback() {
        let mut app = app();
        load(&mut app, tasks());
        let commands = update_task(&mut app, "a", TaskPatch::status(TaskStatus::Done));
        let Some(Command::UpdateTask { seq, .. }) = commands.first() else {
            panic!("expected update command");
        };
        assert_eq!(app.domain.task("a").map(|t| t.status), Some(TaskStatus::Done));

        dispatch(
            &mut app,
            Msg::TaskUpdated {
                seq: *seq,
                id: "a".into(),
                result: Err(RepoError::Status {
                    status: 500,
                    message: "boom".into(),
                }),
            },
        );
        assert_eq!(app.domain.task("a").map(|t| t.status), Some(TaskStatus::Todo));
        assert!(app.domain.last_error.is_some());
        assert!(app.domain.ledger.is_empty());
    }

    #[test]
    fn invalid_patch_issues_no_command() {
        let mut app = app();
        load(&mut app, tasks());
        let patch = TaskPatch {
            priority: Some(-1),
            ..Default::default()
        };
        assert!(update_task(&mut app, "a", patch).is_empty());
        assert!(app.domain.last_error.is_some());
    }

    #[test]
    fn update_not_found_triggers_refresh() {
        let mut app = app();
        load(&mut app, tasks());
        let commands = update_task(&mut app, "b", TaskPatch::status(TaskStatus::Review));
        let Some(Command::UpdateTask { seq, .. }) = commands.first() else {
            panic!("expected update command");
        };
        let follow = dispatch(
            &mut app,
            Msg::TaskUpdated {
                seq: *seq,
                id: "b".into(),
                result: Err(RepoError::NotFound("b".into())),
            },
        );
        assert!(matches!(follow.first(), Some(Command::FetchTasks { .. })));
        assert!(app.domain.task("b").is_none());
        assert!(app.domain.last_error.is_none());
    }

    #[test]
    fn tick_refreshes_and_reschedules() {
        let mut app = app();
        let commands = dispatch(&mut app, Msg::Tick);
        assert!(matches!(commands.first(), Some(Command::FetchTasks { .. })));
        assert!(matches!(commands.last(), Some(Command::ScheduleTick { .. })));
    }

    #[test]
    fn tick_is_inert_when_polling_disabled() {
        let config = AppConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        let mut app = App::new(&config, false);
        assert!(dispatch(&mut app, Msg::Tick).is_empty());
        assert!(!app.startup_commands().iter().any(|c| matches!(c, Command::ScheduleTick { .. })));
    }

    #[test]
    fn push_event_refreshes_and_keeps_listening() {
        let mut app = App::new(&AppConfig::default(), true);
        let commands = dispatch(&mut app, Msg::Push(PushEvent::TaskDeleted { id: "a".into() }));
        assert_eq!(commands.first(), Some(&Command::ListenPush));
        assert!(commands.iter().any(|c| matches!(c, Command::FetchTasks { .. })));

        let commands = dispatch(&mut app, Msg::Push(PushEvent::Disconnected));
        assert_eq!(commands, vec![Command::ListenPush]);
        assert!(!app.domain.connected);
    }

    #[test]
    fn sort_cycle_keeps_selected_task() {
        let mut app = app();
        load(&mut app, tasks());
        app.view.selected = 1; // "c"
        for _ in 0..3 {
            dispatch(&mut app, key('o'));
            assert_eq!(app.selected_id().as_deref(), Some("c"));
        }
    }

    #[test]
    fn status_edit_modal_issues_update() {
        let mut app = app();
        load(&mut app, tasks());
        let Some(task) = app.selected_task().cloned() else {
            panic!("a task should be selected");
        };
        assert!(app.modals.show(Modal::StatusEdit(StatusEditState::new(&task))));
        dispatch(&mut app, key('j'));
        let commands = dispatch(&mut app, Msg::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(matches!(commands.first(), Some(Command::UpdateTask { .. })));
        assert!(!app.modals.is_active());
    }

    #[test]
    fn resize_updates_viewport() {
        let mut app = app();
        dispatch(&mut app, Msg::Resize { width: 100, height: 40 });
        assert_eq!((app.view.width, app.view.height), (100, 40));
    }

    fn server_error() -> RepoError {
        RepoError::Status {
            status: 500,
            message: "boom".into(),
        }
    }

    #[test]
    fn project_success_does_not_hide_task_failure() {
        let mut app = app();
        load(&mut app, tasks());
        let commands = refresh(&mut app, "Refreshing");
        let Some(Command::FetchTasks { seq, .. }) = commands.first() else {
            panic!("expected task fetch");
        };
        dispatch(&mut app, Msg::TasksLoaded { seq: *seq, result: Err(server_error()) });
        dispatch(&mut app, Msg::ProjectsLoaded { result: Ok(vec![]) });
        assert!(!app.domain.connected);
        assert_eq!(app.domain.last_error.as_deref(), Some("server returned 500: boom"));
        assert!(!app.domain.loading);
    }

    #[test]
    fn task_failure_after_project_success_stays_visible() {
        let mut app = app();
        load(&mut app, tasks());
        let commands = refresh(&mut app, "Refreshing");
        let Some(Command::FetchTasks { seq, .. }) = commands.first() else {
            panic!("expected task fetch");
        };
        dispatch(&mut app, Msg::ProjectsLoaded { result: Ok(vec![]) });
        dispatch(&mut app, Msg::TasksLoaded { seq: *seq, result: Err(server_error()) });
        assert!(!app.domain.connected);
        assert!(app.domain.last_error.is_some());

        // Both halves succeeding again brings the session back
        load(&mut app, tasks());
        assert!(app.domain.connected);
        assert_eq!(app.domain.last_error, None);
    }

    #[test]
    fn project_failure_survives_task_success() {
        let mut app = app();
        load(&mut app, tasks());
        let commands = refresh(&mut app, "Refreshing");
        let Some(Command::FetchTasks { seq, .. }) = commands.first() else {
            panic!("expected task fetch");
        };
        dispatch(&mut app, Msg::ProjectsLoaded { result: Err(server_error()) });
        dispatch(&mut app, Msg::TasksLoaded { seq: *seq, result: Ok(tasks()) });
        assert!(!app.domain.connected);
        assert!(app.domain.last_error.is_some());
    }

    #[test]
    fn confirming_first_edit_keeps_second_in_flight() {
        let mut app = app();
        load(&mut app, tasks());
        let first = update_task(&mut app, "a", TaskPatch::status(TaskStatus::Doing));
        let Some(Command::UpdateTask { seq: first_seq, .. }) = first.first() else {
            panic!("expected update command");
        };
        let second = TaskPatch {
            priority: Some(99),
            ..Default::default()
        };
        update_task(&mut app, "a", second);
        assert_eq!(app.domain.task("a").map(|t| t.priority), Some(99));

        // The server copy for the first edit predates the second one
        let server = Task::new("a", "p", "Alpha", TaskStatus::Doing, 10);
        dispatch(
            &mut app,
            Msg::TaskUpdated {
                seq: *first_seq,
                id: "a".into(),
                result: Ok(server),
            },
        );
        let task = app.domain.task("a").cloned();
        assert_eq!(task.as_ref().map(|t| t.status), Some(TaskStatus::Doing));
        assert_eq!(task.map(|t| t.priority), Some(99));
    }

    #[test]
    fn typing_a_search_keeps_every_row_visible() {
        let mut app = app();
        load(&mut app, tasks());
        dispatch(&mut app, key('/'));
        dispatch(&mut app, key('a'));
        dispatch(&mut app, key('l'));
        // Non-matches are dimmed, not removed
        assert_eq!(app.visible_len(), 3);
        assert_eq!(app.view.search.matches.len(), 1);
        dispatch(&mut app, Msg::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert_eq!(app.visible_len(), 3);
    }
}
