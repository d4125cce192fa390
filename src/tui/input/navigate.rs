use crossterm::event::KeyEvent;
use tracing::{debug, info};

use crate::io::client::TaskPatch;
use crate::model::TaskStatus;
use crate::ops::{pipeline, selection};
use crate::tui::app::App;
use crate::tui::dispatch;
use crate::tui::keys::{self, AppAction, FAST_STEP, NavAction, TaskAction};
use crate::tui::message::Command;
use crate::tui::modal::{
    ConfirmAction, ConfirmState, FeatureSelectState, Modal, StatusEditState, TaskEditState,
};
use crate::tui::render::detail_view;
use crate::tui::state::{Panel, ViewMode};

use super::*;

/// Keys shared by both view modes
pub(super) fn handle_app_action(app: &mut App, action: AppAction) -> Vec<Command> {
    let picking = app.view.mode == ViewMode::ProjectSelect;
    match action {
        AppAction::Quit if picking => app.view.mode = ViewMode::Tasks,
        AppAction::Quit => {
            app.modals.show(Modal::Confirm(ConfirmState::new(ConfirmAction::Quit)));
        }
        AppAction::Refresh => {
            info!("manual refresh");
            return dispatch::refresh(app, "Refreshing");
        }
        AppAction::ProjectSelect => {
            app.view.mode = ViewMode::ProjectSelect;
            app.view.project_cursor = app
                .domain
                .selected_project
                .as_ref()
                .and_then(|id| app.domain.projects.iter().position(|p| &p.id == id))
                .map_or(0, |pos| pos + 1);
        }
        AppAction::ShowAll => return dispatch::select_project(app, None),
        AppAction::Confirm if picking => {
            let chosen = match app.view.project_cursor {
                0 => None,
                n => app.domain.projects.get(n - 1).map(|p| p.id.clone()),
            };
            return dispatch::select_project(app, chosen);
        }
        AppAction::Confirm => {
            if app.selected_task().is_some() {
                app.view.panel = Panel::Details;
                app.view.details_scroll = 0;
            }
        }
        AppAction::Escape if picking => app.view.mode = ViewMode::Tasks,
        AppAction::Escape => {
            if app.domain.last_error.is_some() {
                app.domain.last_error = None;
            } else if app.view.panel == Panel::Details {
                app.view.panel = Panel::List;
            } else if app.view.search.is_active() {
                app.view.search.clear();
                app.recompute_matches();
            }
        }
        AppAction::Help => {
            app.modals.show(Modal::Help { scroll: 0 });
        }
    }
    Vec::new()
}

/// Task list keys
pub(super) fn handle_task_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    let Some(action) = keys::task_action(&key) else {
        return Vec::new();
    };
    debug!(?action, "task key");

    match action {
        TaskAction::Nav(nav) if app.view.panel == Panel::Details => scroll_details(app, nav),
        TaskAction::Nav(nav) => move_selection(app, nav),
        TaskAction::Search => start_search(app),
        TaskAction::NextMatch | TaskAction::PrevMatch => jump_to_match(app, action),
        TaskAction::EditStatus => {
            if let Some(task) = app.selected_task() {
                let modal = Modal::StatusEdit(StatusEditState::new(task));
                app.modals.show(modal);
            }
        }
        TaskAction::EditTask => {
            if let Some(task) = app.selected_task() {
                let modal = Modal::TaskEdit(TaskEditState::new(task));
                app.modals.show(modal);
            }
        }
        TaskAction::Delete => {
            if let Some(task) = app.selected_task() {
                let action = ConfirmAction::DeleteTask {
                    id: task.id.clone(),
                    title: task.title.clone(),
                };
                app.modals.show(Modal::Confirm(ConfirmState::new(action)));
            }
        }
        TaskAction::CopyId => {
            if let Some(task) = app.selected_task() {
                return vec![Command::CopyToClipboard {
                    label: "id",
                    text: task.id.clone(),
                }];
            }
        }
        TaskAction::CopyTitle => {
            if let Some(task) = app.selected_task() {
                return vec![Command::CopyToClipboard {
                    label: "title",
                    text: task.title.clone(),
                }];
            }
        }
        TaskAction::SortNext | TaskAction::SortPrev => {
            let forward = action == TaskAction::SortNext;
            app.reflow(|app| {
                let mode = app.domain.sort_mode;
                app.domain.sort_mode = if forward { mode.next() } else { mode.prev() };
            });
            info!(sort = app.domain.sort_mode.label(), "sort mode changed");
        }
        TaskAction::FeatureFilter => {
            let tags = pipeline::feature_tags(&app.domain.tasks);
            if tags.is_empty() {
                app.notify("No feature tags in view");
            } else {
                let state = FeatureSelectState::new(&tags, app.domain.feature_filter.as_ref());
                app.modals.show(Modal::FeatureSelect(state));
            }
        }
        TaskAction::StatusFilter => {
            app.modals.show(Modal::StatusFilter { cursor: 0 });
        }
        TaskAction::SwitchPanel => {
            app.view.panel = match app.view.panel {
                Panel::List if app.selected_task().is_some() => Panel::Details,
                _ => Panel::List,
            };
            app.view.details_scroll = 0;
        }
        TaskAction::SetStatus(status) => return set_status(app, status),
    }
    Vec::new()
}

/// Project picker keys: the navigation keys over "all projects" plus each project
pub(super) fn handle_project_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    if let Some(nav) = keys::nav_action(&key) {
        let len = app.project_entries();
        let half = app.view.half_page();
        app.view.project_cursor = apply_nav(app.view.project_cursor, nav, len, half);
    }
    Vec::new()
}

/// Change the selected task's status unless it already has it
pub(super) fn set_status(app: &mut App, status: TaskStatus) -> Vec<Command> {
    match app.selected_task() {
        Some(task) if task.status != status => {
            let id = task.id.clone();
            dispatch::update_task(app, &id, TaskPatch::status(status))
        }
        _ => Vec::new(),
    }
}

fn move_selection(app: &mut App, nav: NavAction) {
    let before = app.view.selected;
    let half = app.view.half_page();
    app.view.selected = apply_nav(before, nav, app.visible_len(), half);
    if app.view.selected != before {
        app.view.details_scroll = 0;
    }
}

fn scroll_details(app: &mut App, nav: NavAction) {
    let max = app
        .selected_task()
        .map_or(0, |task| detail_view::content_height(task).saturating_sub(1));
    let half = app.view.half_page();
    app.view.details_scroll = apply_nav(app.view.details_scroll, nav, max + 1, half);
}

/// New cursor position after `nav` in a list of `len` rows
fn apply_nav(index: usize, nav: NavAction, len: usize, half_page: usize) -> usize {
    let half = half_page as isize;
    let fast = FAST_STEP as isize;
    match nav {
        NavAction::Up => selection::step(index, -1, len),
        NavAction::Down => selection::step(index, 1, len),
        NavAction::FastUp => selection::step(index, -fast, len),
        NavAction::FastDown => selection::step(index, fast, len),
        NavAction::HalfPageUp => selection::step(index, -half, len),
        NavAction::HalfPageDown => selection::step(index, half, len),
        NavAction::Top => 0,
        NavAction::Bottom => len.saturating_sub(1),
    }
}

fn jump_to_match(app: &mut App, action: TaskAction) {
    let selected = app.view.selected;
    let target = if action == TaskAction::NextMatch {
        app.view.search.next_match(selected)
    } else {
        app.view.search.prev_match(selected)
    };
    match target {
        Some(index) => {
            app.view.selected = index;
            app.view.details_scroll = 0;
        }
        None => {
            if let Some(query) = app.view.search.active_query() {
                let message = format!("Pattern not found: {}", query);
                app.notify(message);
            }
        }
    }
}
