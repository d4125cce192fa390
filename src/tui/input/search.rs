use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::ops::selection;
use crate::tui::app::App;
use crate::tui::keys;
use crate::tui::state::Panel;

/// Begin typing a search. An existing query is preloaded.
pub(super) fn start_search(app: &mut App) {
    app.view.panel = Panel::List;
    app.view.search_origin = app.view.selected;
    app.view.search.activate();
    search_live(app);
}

/// Handle a key while a search query is being typed
pub(super) fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => cancel_search(app),
        KeyCode::Enter => {
            if let Some(query) = app.view.search.commit() {
                debug!(query = %query, matches = app.view.search.matches.len(), "search committed");
                app.domain.search_history.record(&query);
            }
            app.recompute_matches();
        }
        KeyCode::Backspace => {
            app.view.search.backspace();
            search_live(app);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.view.search.clear_input();
            search_live(app);
        }
        KeyCode::Up => {
            if app.view.search.history_older(&app.domain.search_history) {
                search_live(app);
            }
        }
        KeyCode::Down => {
            if app.view.search.history_newer(&app.domain.search_history) {
                search_live(app);
            }
        }
        _ => {
            if let Some(c) = keys::plain_char(&key) {
                app.view.search.push_char(c);
                search_live(app);
            }
        }
    }
}

/// Abandon typing: restore the previously committed query and the selection
/// held when typing began
pub(super) fn cancel_search(app: &mut App) {
    app.view.search.cancel();
    app.view.selected = selection::clamp(app.view.search_origin, app.visible_len());
    app.recompute_matches();
}

/// Re-run matching for the buffer and jump to the first match at or after
/// the selection held when typing began
pub(super) fn search_live(app: &mut App) {
    app.recompute_matches();
    let origin = selection::clamp(app.view.search_origin, app.visible_len());
    app.view.selected = app.view.search.first_match_from(origin).unwrap_or(origin);
}
