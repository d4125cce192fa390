mod modal;
mod navigate;
mod search;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info};

use super::app::App;
use super::keys::{self, Emergency};
use super::message::Command;
use super::modal::{Modal, ModalKind};
use super::state::ViewMode;

// Import all submodule functions into this module's namespace
// so that submodules can access cross-module functions via `use super::*;`
#[allow(unused_imports)]
use modal::*;
#[allow(unused_imports)]
use navigate::*;
#[allow(unused_imports)]
use search::*;

/// Route a key through the priority chain. The first tier that claims the
/// key handles it:
///
/// 1. emergency keys (force quit, help)
/// 2. literal text while a search is being typed
/// 3. the active modal
/// 4. application keys valid in every view mode
/// 5. keys specific to the current view mode
pub fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Command> {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return Vec::new();
    }
    let key = keys::normalize_key(key);
    app.view.notice = None;

    if let Some(action) = keys::emergency(&key) {
        handle_emergency(app, action);
        return Vec::new();
    }

    if app.view.search.is_typing() {
        handle_search_key(app, key);
        return Vec::new();
    }

    if app.modals.is_active() {
        return handle_modal_key(app, key);
    }

    if let Some(action) = keys::app_action(&key) {
        debug!(?action, mode = ?app.view.mode, "app key");
        return handle_app_action(app, action);
    }

    match app.view.mode {
        ViewMode::Tasks => handle_task_key(app, key),
        ViewMode::ProjectSelect => handle_project_key(app, key),
    }
}

/// Handle a bracketed paste. Text goes to the search buffer while typing, or
/// to the focused field of the task editor; elsewhere it is dropped.
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    let clean = text.replace(['\n', '\r'], " ");
    if app.view.search.is_typing() {
        app.view.search.push_str(&clean);
        search_live(app);
        return;
    }
    if let Some(Modal::TaskEdit(state)) = app.modals.active_mut() {
        state.insert_str(&clean);
    }
}

fn handle_emergency(app: &mut App, action: Emergency) {
    match action {
        Emergency::ForceQuit => {
            info!("force quit");
            app.should_quit = true;
        }
        Emergency::ToggleHelp => {
            if app.modals.kind() == ModalKind::Help {
                app.modals.hide();
                return;
            }
            // Typing would otherwise swallow every key the help overlay needs
            if app.view.search.is_typing() {
                cancel_search(app);
            }
            app.modals.show(Modal::Help { scroll: 0 });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppConfig, Task, TaskStatus};
    use crate::ops::search::SearchPhase;
    use crate::tui::message::Msg;
    use crate::tui::modal::{ConfirmAction, ConfirmState};
    use crate::tui::state::Panel;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn app_with(tasks: Vec<Task>) -> App {
        let mut app = App::new(&AppConfig::default(), false);
        app.view.height = 24;
        app.reflow(|app| app.domain.tasks = tasks);
        app
    }

    fn sample() -> App {
        app_with(vec![
            Task::new("a", "p", "Add authentication", TaskStatus::Todo, 50),
            Task::new("b", "p", "Fix UI", TaskStatus::Todo, 40),
            Task::new("c", "p", "OAuth refactor", TaskStatus::Todo, 30),
            Task::new("d", "p", "Docs", TaskStatus::Todo, 20),
            Task::new("e", "p", "Release", TaskStatus::Todo, 10),
        ])
    }

    fn press(app: &mut App, code: KeyCode) -> Vec<Command> {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> Vec<Command> {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn ctrl_c_quits_from_any_state() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        assert!(app.view.search.is_typing());
        ctrl(&mut app, 'c');
        assert!(app.should_quit);

        let mut app = sample();
        app.modals.show(Modal::Confirm(ConfirmState::new(ConfirmAction::Quit)));
        ctrl(&mut app, 'c');
        assert!(app.should_quit);
    }

    #[test]
    fn typing_captures_letters_that_are_otherwise_commands() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "q?d");
        assert!(!app.should_quit);
        assert!(!app.modals.is_active());
        assert_eq!(app.view.search.input, "q?d");
    }

    #[test]
    fn live_search_jumps_to_first_match_from_origin() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "auth");
        // "Add authentication" (0) and "OAuth refactor" (2); origin is 1
        assert_eq!(app.view.search.matches, vec![0, 2]);
        assert_eq!(app.view.selected, 2);
    }

    #[test]
    fn commit_then_navigate_matches_with_wrap() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "auth");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view.search.phase, SearchPhase::Committed);
        assert_eq!(app.domain.search_history.get(0), Some("auth"));
        assert_eq!(app.view.selected, 0);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.view.selected, 2);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.view.selected, 0);
        press(&mut app, KeyCode::Char('N'));
        assert_eq!(app.view.selected, 2);
    }

    #[test]
    fn escape_restores_prior_query_and_selection() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "fix");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view.selected, 1);

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.view.search.input, "fix");
        type_str(&mut app, "zzz");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view.search.phase, SearchPhase::Committed);
        assert_eq!(app.view.search.query, "fix");
        assert_eq!(app.view.search.matches, vec![1]);
        assert_eq!(app.view.selected, 1);
    }

    #[test]
    fn escape_clears_committed_search_in_tasks_mode() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "fix");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert!(!app.view.search.is_active());
        assert!(app.view.search.matches.is_empty());
    }

    #[test]
    fn escape_dismisses_error_before_anything_else() {
        let mut app = sample();
        app.view.panel = Panel::Details;
        app.domain.last_error = Some("boom".into());
        press(&mut app, KeyCode::Esc);
        assert!(app.domain.last_error.is_none());
        assert_eq!(app.view.panel, Panel::Details);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view.panel, Panel::List);
    }

    #[test]
    fn history_browse_with_arrows() {
        let mut app = sample();
        for q in ["fix", "docs"] {
            press(&mut app, KeyCode::Char('/'));
            type_str(&mut app, q);
            press(&mut app, KeyCode::Enter);
        }
        app.view.search.clear();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.view.search.input, "docs");
        press(&mut app, KeyCode::Up);
        assert_eq!(app.view.search.input, "fix");
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.view.search.input, "");
    }

    #[test]
    fn ctrl_u_clears_search_buffer() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "abc");
        ctrl(&mut app, 'u');
        assert_eq!(app.view.search.input, "");
        assert!(app.view.search.is_typing());
    }

    #[test]
    fn modal_captures_keys_before_app_keys() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.modals.kind(), ModalKind::Confirmation);
        // 'p' would enter project select without the modal
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.view.mode, ViewMode::Tasks);
        press(&mut app, KeyCode::Char('y'));
        assert!(app.should_quit);
    }

    #[test]
    fn f1_toggles_help_and_cancels_typing() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "x");
        press(&mut app, KeyCode::F(1));
        assert!(!app.view.search.is_typing());
        assert_eq!(app.modals.kind(), ModalKind::Help);
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.modals.kind(), ModalKind::None);
    }

    #[test]
    fn navigation_on_empty_list_is_noop() {
        let mut app = app_with(vec![]);
        for code in [KeyCode::Char('j'), KeyCode::Char('G'), KeyCode::Char('K')] {
            press(&mut app, code);
            assert_eq!(app.view.selected, 0);
        }
        assert!(press(&mut app, KeyCode::Char('s')).is_empty());
        assert!(!app.modals.is_active());
    }

    #[test]
    fn fast_and_edge_navigation() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('J'));
        assert_eq!(app.view.selected, 4);
        press(&mut app, KeyCode::Char('K'));
        assert_eq!(app.view.selected, 0);
        press(&mut app, KeyCode::End);
        assert_eq!(app.view.selected, 4);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.view.selected, 0);
        ctrl(&mut app, 'd');
        assert_eq!(app.view.selected, 4);
    }

    #[test]
    fn quick_status_key_issues_update() {
        let mut app = sample();
        let commands = press(&mut app, KeyCode::Char('2'));
        assert!(matches!(commands.first(), Some(Command::UpdateTask { .. })));
        assert_eq!(app.domain.task("a").map(|t| t.status), Some(TaskStatus::Doing));
        // Same status again is a no-op
        let pos = app.visible_tasks().position(|t| t.id == "a").unwrap_or(0);
        app.view.selected = pos;
        assert!(press(&mut app, KeyCode::Char('2')).is_empty());
    }

    #[test]
    fn project_select_mode_navigates_and_chooses() {
        let mut app = sample();
        app.domain.projects = vec![
            crate::model::Project::new("p", "Main"),
            crate::model::Project::new("q", "Other"),
        ];
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.view.mode, ViewMode::ProjectSelect);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        let commands = press(&mut app, KeyCode::Enter);
        assert_eq!(app.view.mode, ViewMode::Tasks);
        assert_eq!(app.domain.selected_project.as_deref(), Some("q"));
        assert_eq!(app.visible_len(), 0);
        assert!(matches!(commands.first(), Some(Command::FetchTasks { .. })));

        let commands = press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.domain.selected_project, None);
        assert_eq!(app.visible_len(), 5);
        assert!(!commands.is_empty());
    }

    #[test]
    fn q_leaves_project_select_without_quitting() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.view.mode, ViewMode::Tasks);
        assert!(!app.modals.is_active());
        assert!(!app.should_quit);
    }

    #[test]
    fn delete_goes_through_confirmation() {
        let mut app = sample();
        assert!(press(&mut app, KeyCode::Char('d')).is_empty());
        assert_eq!(app.modals.kind(), ModalKind::Confirmation);
        let commands = press(&mut app, KeyCode::Char('y'));
        assert!(matches!(commands.first(), Some(Command::DeleteTask { .. })));
        assert!(app.domain.task("a").is_none());
        assert_eq!(app.selected_id().as_deref(), Some("b"));
    }

    #[test]
    fn paste_lands_in_search_buffer() {
        let mut app = sample();
        press(&mut app, KeyCode::Char('/'));
        handle_paste(&mut app, "oauth\n");
        assert_eq!(app.view.search.input, "oauth ");
        // Trailing space is part of the query; "OAuth refactor" still matches
        assert_eq!(app.view.search.matches, vec![2]);
    }

    #[test]
    fn copy_keys_issue_clipboard_commands() {
        let mut app = sample();
        assert_eq!(
            press(&mut app, KeyCode::Char('y')),
            vec![Command::CopyToClipboard {
                label: "id",
                text: "a".into()
            }]
        );
        assert_eq!(
            press(&mut app, KeyCode::Char('Y')),
            vec![Command::CopyToClipboard {
                label: "title",
                text: "Add authentication".into()
            }]
        );
    }

    #[test]
    fn notice_clears_on_next_key() {
        let mut app = sample();
        crate::tui::dispatch::dispatch(
            &mut app,
            Msg::Copied {
                label: "id",
                result: Ok(()),
            },
        );
        assert!(app.view.notice.is_some());
        press(&mut app, KeyCode::Char('j'));
        assert!(app.view.notice.is_none());
    }
}
