//! Key-to-action lookup tables used by the input router.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::TaskStatus;

/// Rows moved by the fast navigation keys
pub const FAST_STEP: usize = 4;

/// Keys honored in every state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emergency {
    ForceQuit,
    ToggleHelp,
}

/// Keys valid in both view modes, with mode-sensitive meaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Refresh,
    ProjectSelect,
    ShowAll,
    Confirm,
    Escape,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    FastUp,
    FastDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,
}

/// Keys specific to the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Nav(NavAction),
    Search,
    NextMatch,
    PrevMatch,
    EditStatus,
    EditTask,
    Delete,
    CopyId,
    CopyTitle,
    SortNext,
    SortPrev,
    FeatureFilter,
    StatusFilter,
    SwitchPanel,
    SetStatus(TaskStatus),
}

/// Map Shift+letter reported as lowercase (kitty protocol) to the uppercase
/// char most terminals send.
pub fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}

/// The character of a key pressed with no modifier other than Shift
pub fn plain_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if (key.modifiers - KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}

fn ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

pub fn emergency(key: &KeyEvent) -> Option<Emergency> {
    if ctrl(key, 'c') {
        return Some(Emergency::ForceQuit);
    }
    match key.code {
        KeyCode::F(1) => Some(Emergency::ToggleHelp),
        _ => None,
    }
}

pub fn app_action(key: &KeyEvent) -> Option<AppAction> {
    match key.code {
        KeyCode::Enter => return Some(AppAction::Confirm),
        KeyCode::Esc => return Some(AppAction::Escape),
        KeyCode::F(5) => return Some(AppAction::Refresh),
        _ => {}
    }
    match plain_char(key)? {
        'q' => Some(AppAction::Quit),
        'r' => Some(AppAction::Refresh),
        'p' => Some(AppAction::ProjectSelect),
        'a' => Some(AppAction::ShowAll),
        '?' => Some(AppAction::Help),
        _ => None,
    }
}

pub fn nav_action(key: &KeyEvent) -> Option<NavAction> {
    if ctrl(key, 'd') {
        return Some(NavAction::HalfPageDown);
    }
    if ctrl(key, 'u') {
        return Some(NavAction::HalfPageUp);
    }
    match key.code {
        KeyCode::Up => return Some(NavAction::Up),
        KeyCode::Down => return Some(NavAction::Down),
        KeyCode::PageUp => return Some(NavAction::HalfPageUp),
        KeyCode::PageDown => return Some(NavAction::HalfPageDown),
        KeyCode::Home => return Some(NavAction::Top),
        KeyCode::End => return Some(NavAction::Bottom),
        _ => {}
    }
    match plain_char(key)? {
        'k' => Some(NavAction::Up),
        'j' => Some(NavAction::Down),
        'K' => Some(NavAction::FastUp),
        'J' => Some(NavAction::FastDown),
        'g' => Some(NavAction::Top),
        'G' => Some(NavAction::Bottom),
        _ => None,
    }
}

pub fn task_action(key: &KeyEvent) -> Option<TaskAction> {
    if let Some(nav) = nav_action(key) {
        return Some(TaskAction::Nav(nav));
    }
    if key.code == KeyCode::Tab {
        return Some(TaskAction::SwitchPanel);
    }
    match plain_char(key)? {
        '/' => Some(TaskAction::Search),
        'n' => Some(TaskAction::NextMatch),
        'N' => Some(TaskAction::PrevMatch),
        's' => Some(TaskAction::EditStatus),
        'e' => Some(TaskAction::EditTask),
        'd' => Some(TaskAction::Delete),
        'y' => Some(TaskAction::CopyId),
        'Y' => Some(TaskAction::CopyTitle),
        'o' => Some(TaskAction::SortNext),
        'O' => Some(TaskAction::SortPrev),
        'f' => Some(TaskAction::FeatureFilter),
        'v' => Some(TaskAction::StatusFilter),
        '1' => Some(TaskAction::SetStatus(TaskStatus::Todo)),
        '2' => Some(TaskAction::SetStatus(TaskStatus::Doing)),
        '3' => Some(TaskAction::SetStatus(TaskStatus::Review)),
        '4' => Some(TaskAction::SetStatus(TaskStatus::Done)),
        _ => None,
    }
}
