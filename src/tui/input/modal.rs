use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::io::client::ValidationError;
use crate::model::TaskStatus;
use crate::tui::app::App;
use crate::tui::dispatch;
use crate::tui::keys;
use crate::tui::message::Command;
use crate::tui::modal::{ConfirmAction, Modal, ModalKind};
use crate::tui::render::help_overlay;

/// Every key goes to the active modal while one is open
pub(super) fn handle_modal_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    match app.modals.kind() {
        ModalKind::None => Vec::new(),
        ModalKind::Help => {
            help_key(app, key);
            Vec::new()
        }
        ModalKind::StatusEdit => status_edit_key(app, key),
        ModalKind::Confirmation => confirm_key(app, key),
        ModalKind::TaskEdit => task_edit_key(app, key),
        ModalKind::FeatureSelect => feature_select_key(app, key),
        ModalKind::StatusFilter => status_filter_key(app, key),
    }
}

/// Cursor movement shared by the list-style modals
fn vertical(key: &KeyEvent) -> Option<isize> {
    match key.code {
        KeyCode::Up => Some(-1),
        KeyCode::Down => Some(1),
        _ => match keys::plain_char(key) {
            Some('k') => Some(-1),
            Some('j') => Some(1),
            _ => None,
        },
    }
}

fn is_close(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc || keys::plain_char(key) == Some('q')
}

/// Status picked by a number key, `1`-`4`
fn status_digit(key: &KeyEvent) -> Option<TaskStatus> {
    let digit = keys::plain_char(key)?.to_digit(10)? as usize;
    TaskStatus::ALL.get(digit.checked_sub(1)?).copied()
}

fn help_key(app: &mut App, key: KeyEvent) {
    if is_close(&key) || key.code == KeyCode::Enter || keys::plain_char(&key) == Some('?') {
        app.modals.hide();
        return;
    }
    let len = help_overlay::content_height(app);
    if let (Some(delta), Some(Modal::Help { scroll })) = (vertical(&key), app.modals.active_mut()) {
        *scroll = crate::ops::selection::step(*scroll, delta, len);
    }
}

fn status_edit_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    if is_close(&key) {
        app.modals.hide();
        return Vec::new();
    }
    let Some(Modal::StatusEdit(state)) = app.modals.active_mut() else {
        return Vec::new();
    };
    if let Some(delta) = vertical(&key) {
        state.move_cursor(delta);
        return Vec::new();
    }
    let status = match status_digit(&key) {
        Some(status) => status,
        None if key.code == KeyCode::Enter => state.selected(),
        None => return Vec::new(),
    };
    let id = state.task_id.clone();
    app.modals.hide();
    match app.domain.task(&id) {
        Some(task) if task.status != status => {
            dispatch::update_task(app, &id, crate::io::client::TaskPatch::status(status))
        }
        _ => Vec::new(),
    }
}

fn confirm_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    let Some(Modal::Confirm(state)) = app.modals.active_mut() else {
        return Vec::new();
    };
    let confirmed = match key.code {
        KeyCode::Esc => false,
        KeyCode::Enter => state.yes_focused,
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
            state.yes_focused = !state.yes_focused;
            return Vec::new();
        }
        _ => match keys::plain_char(&key) {
            Some('y' | 'Y') => true,
            Some('n' | 'N') => false,
            Some('h' | 'l') => {
                state.yes_focused = !state.yes_focused;
                return Vec::new();
            }
            _ => return Vec::new(),
        },
    };
    let Some(Modal::Confirm(state)) = app.modals.hide() else {
        return Vec::new();
    };
    if !confirmed {
        debug!(action = ?state.action, "confirmation declined");
        return Vec::new();
    }
    match state.action {
        ConfirmAction::Quit => {
            info!("quit confirmed");
            app.should_quit = true;
            Vec::new()
        }
        ConfirmAction::DeleteTask { id, .. } => dispatch::delete_task(app, &id),
    }
}

fn task_edit_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    let Some(Modal::TaskEdit(state)) = app.modals.active_mut() else {
        return Vec::new();
    };
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            app.modals.hide();
        }
        KeyCode::Tab | KeyCode::Down => state.focus_next(),
        KeyCode::BackTab | KeyCode::Up => state.focus_prev(),
        KeyCode::Backspace => state.backspace(),
        KeyCode::Char('u') if ctrl => state.clear_field(),
        KeyCode::Enter => {
            let id = state.original.id.clone();
            match state.to_patch() {
                Ok(patch) => {
                    app.modals.hide();
                    return dispatch::update_task(app, &id, patch);
                }
                Err(ValidationError::Empty) => {
                    app.modals.hide();
                }
                Err(e) => {
                    debug!(id = %id, error = %e, "task edit rejected");
                    state.error = Some(e.to_string());
                }
            }
        }
        _ => {
            if let Some(c) = keys::plain_char(&key) {
                state.insert_str(c.encode_utf8(&mut [0; 4]));
            }
        }
    }
    Vec::new()
}

fn feature_select_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    if is_close(&key) {
        app.modals.hide();
        return Vec::new();
    }
    let Some(Modal::FeatureSelect(state)) = app.modals.active_mut() else {
        return Vec::new();
    };
    if let Some(delta) = vertical(&key) {
        state.move_cursor(delta);
        return Vec::new();
    }
    let filter = match (key.code, keys::plain_char(&key)) {
        (_, Some(' ')) => {
            state.toggle();
            return Vec::new();
        }
        (_, Some('a')) => {
            state.set_all(true);
            return Vec::new();
        }
        (_, Some('n')) => {
            state.set_all(false);
            return Vec::new();
        }
        // Clear the filter outright
        (_, Some('c')) => None,
        (KeyCode::Enter, _) => {
            let entries = std::mem::take(&mut state.entries);
            // Everything checked filters nothing; new tags stay visible
            (!entries.values().all(|checked| *checked)).then_some(entries)
        }
        _ => return Vec::new(),
    };
    app.modals.hide();
    info!(filter = ?filter, "feature filter applied");
    dispatch::refilter(app, |app| app.domain.feature_filter = filter)
}

fn status_filter_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    if is_close(&key) || keys::plain_char(&key) == Some('v') || key.code == KeyCode::Enter {
        app.modals.hide();
        return Vec::new();
    }
    let Some(Modal::StatusFilter { cursor }) = app.modals.active_mut() else {
        return Vec::new();
    };
    if let Some(delta) = vertical(&key) {
        *cursor = crate::ops::selection::step(*cursor, delta, TaskStatus::ALL.len());
        return Vec::new();
    }
    let status = match status_digit(&key) {
        Some(status) => status,
        None if matches!(keys::plain_char(&key), Some(' ' | 'x')) => {
            TaskStatus::ALL[(*cursor).min(TaskStatus::ALL.len() - 1)]
        }
        None => return Vec::new(),
    };
    debug!(status = status.as_str(), "status visibility toggled");
    dispatch::refilter(app, |app| app.domain.status_filter.toggle(status))
}
