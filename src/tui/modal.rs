use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::io::client::{TaskPatch, ValidationError};
use crate::model::{FeatureFilter, Task, TaskStatus};

/// Which overlay currently owns focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    None,
    Help,
    StatusEdit,
    Confirmation,
    TaskEdit,
    FeatureSelect,
    StatusFilter,
}

/// An exclusive overlay together with its private state
#[derive(Debug, Clone)]
pub enum Modal {
    Help { scroll: usize },
    StatusEdit(StatusEditState),
    Confirm(ConfirmState),
    TaskEdit(TaskEditState),
    FeatureSelect(FeatureSelectState),
    StatusFilter { cursor: usize },
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        match self {
            Modal::Help { .. } => ModalKind::Help,
            Modal::StatusEdit(_) => ModalKind::StatusEdit,
            Modal::Confirm(_) => ModalKind::Confirmation,
            Modal::TaskEdit(_) => ModalKind::TaskEdit,
            Modal::FeatureSelect(_) => ModalKind::FeatureSelect,
            Modal::StatusFilter { .. } => ModalKind::StatusFilter,
        }
    }
}

/// Enforces that at most one modal is active.
///
/// `show` is rejected while another modal is open; the caller must `hide`
/// first. `hide` always returns to no modal.
#[derive(Debug, Clone, Default)]
pub struct ModalCoordinator {
    active: Option<Modal>,
}

impl ModalCoordinator {
    /// Open `modal` if nothing else is open. Returns whether it was shown.
    pub fn show(&mut self, modal: Modal) -> bool {
        if let Some(current) = &self.active {
            debug!(
                active = ?current.kind(),
                requested = ?modal.kind(),
                "modal show rejected"
            );
            return false;
        }
        self.active = Some(modal);
        true
    }

    pub fn hide(&mut self) -> Option<Modal> {
        self.active.take()
    }

    pub fn kind(&self) -> ModalKind {
        self.active.as_ref().map_or(ModalKind::None, Modal::kind)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Modal> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut Modal> {
        self.active.as_mut()
    }
}

// ---------------------------------------------------------------------------
// Status edit

#[derive(Debug, Clone)]
pub struct StatusEditState {
    pub task_id: String,
    pub title: String,
    /// Index into `TaskStatus::ALL`
    pub cursor: usize,
}

impl StatusEditState {
    pub fn new(task: &Task) -> Self {
        StatusEditState {
            task_id: task.id.clone(),
            title: task.title.clone(),
            cursor: TaskStatus::ALL
                .iter()
                .position(|s| *s == task.status)
                .unwrap_or(0),
        }
    }

    pub fn selected(&self) -> TaskStatus {
        TaskStatus::ALL[self.cursor.min(TaskStatus::ALL.len() - 1)]
    }

    pub fn move_cursor(&mut self, delta: isize) {
        self.cursor = crate::ops::selection::step(self.cursor, delta, TaskStatus::ALL.len());
    }
}

// ---------------------------------------------------------------------------
// Confirmation

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Quit,
    DeleteTask { id: String, title: String },
}

#[derive(Debug, Clone)]
pub struct ConfirmState {
    pub action: ConfirmAction,
    /// Focused button; defaults to "no"
    pub yes_focused: bool,
}

impl ConfirmState {
    pub fn new(action: ConfirmAction) -> Self {
        ConfirmState {
            action,
            yes_focused: false,
        }
    }

    pub fn prompt(&self) -> String {
        match &self.action {
            ConfirmAction::Quit => "Quit tackle?".to_string(),
            ConfirmAction::DeleteTask { title, .. } => format!("Delete \"{}\"?", title),
        }
    }
}

// ---------------------------------------------------------------------------
// Task edit

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Priority,
    Feature,
}

impl EditField {
    pub const ALL: [EditField; 3] = [EditField::Title, EditField::Priority, EditField::Feature];

    pub fn label(self) -> &'static str {
        match self {
            EditField::Title => "Title",
            EditField::Priority => "Priority",
            EditField::Feature => "Feature",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskEditState {
    pub original: Task,
    pub title: String,
    pub priority: String,
    pub feature: String,
    pub focus: EditField,
    /// Validation message from the last save attempt
    pub error: Option<String>,
}

impl TaskEditState {
    pub fn new(task: &Task) -> Self {
        TaskEditState {
            original: task.clone(),
            title: task.title.clone(),
            priority: task.priority.to_string(),
            feature: task.feature.clone().unwrap_or_default(),
            focus: EditField::Title,
            error: None,
        }
    }

    pub fn buffer(&self, field: EditField) -> &str {
        match field {
            EditField::Title => &self.title,
            EditField::Priority => &self.priority,
            EditField::Feature => &self.feature,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            EditField::Title => &mut self.title,
            EditField::Priority => &mut self.priority,
            EditField::Feature => &mut self.feature,
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        self.focused_mut().push_str(&clean);
        self.error = None;
    }

    pub fn backspace(&mut self) {
        let buf = self.focused_mut();
        if let Some((idx, _)) = buf.grapheme_indices(true).next_back() {
            buf.truncate(idx);
        }
        self.error = None;
    }

    pub fn clear_field(&mut self) {
        self.focused_mut().clear();
        self.error = None;
    }

    pub fn focus_next(&mut self) {
        let pos = EditField::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = EditField::ALL[(pos + 1) % EditField::ALL.len()];
    }

    pub fn focus_prev(&mut self) {
        let pos = EditField::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = EditField::ALL[(pos + EditField::ALL.len() - 1) % EditField::ALL.len()];
    }

    /// Build a patch holding only the changed fields, validated
    pub fn to_patch(&self) -> Result<TaskPatch, ValidationError> {
        let mut patch = TaskPatch::default();

        let title = self.title.trim();
        if title != self.original.title {
            patch.title = Some(title.to_string());
        }

        let priority_text = self.priority.trim();
        let priority: i64 = priority_text
            .parse()
            .map_err(|_| ValidationError::InvalidPriority(priority_text.to_string()))?;
        if priority != self.original.priority {
            patch.priority = Some(priority);
        }

        let feature = self.feature.trim();
        let feature = (!feature.is_empty()).then(|| feature.to_string());
        if feature != self.original.feature {
            patch.feature = Some(feature);
        }

        patch.validate()?;
        Ok(patch)
    }
}

// ---------------------------------------------------------------------------
// Feature select

#[derive(Debug, Clone)]
pub struct FeatureSelectState {
    pub entries: FeatureFilter,
    pub cursor: usize,
}

impl FeatureSelectState {
    /// Every known tag, checked according to the current filter (all checked
    /// when no filter is set)
    pub fn new(tags: &[String], current: Option<&FeatureFilter>) -> Self {
        let entries = tags
            .iter()
            .map(|tag| {
                let checked = current.is_none_or(|f| f.get(tag).copied().unwrap_or(false));
                (tag.clone(), checked)
            })
            .collect();
        FeatureSelectState { entries, cursor: 0 }
    }

    pub fn toggle(&mut self) {
        if let Some((_, checked)) = self.entries.get_index_mut(self.cursor) {
            *checked = !*checked;
        }
    }

    pub fn set_all(&mut self, checked: bool) {
        for value in self.entries.values_mut() {
            *value = checked;
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        self.cursor = crate::ops::selection::step(self.cursor, delta, self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_is_rejected_while_another_modal_is_active() {
        let mut modals = ModalCoordinator::default();
        assert!(modals.show(Modal::Help { scroll: 0 }));
        assert!(!modals.show(Modal::StatusFilter { cursor: 0 }));
        assert_eq!(modals.kind(), ModalKind::Help);
        modals.hide();
        assert_eq!(modals.kind(), ModalKind::None);
        assert!(modals.show(Modal::StatusFilter { cursor: 0 }));
    }

    #[test]
    fn hide_without_modal_is_harmless() {
        let mut modals = ModalCoordinator::default();
        assert!(modals.hide().is_none());
        assert!(!modals.is_active());
    }

    #[test]
    fn status_edit_starts_on_current_status() {
        let task = Task::new("t", "p", "T", TaskStatus::Review, 0);
        let mut state = StatusEditState::new(&task);
        assert_eq!(state.selected(), TaskStatus::Review);
        state.move_cursor(5);
        assert_eq!(state.selected(), TaskStatus::Done);
    }

    #[test]
    fn task_edit_patch_holds_only_changes() {
        let task = Task::new("t", "p", "Title", TaskStatus::Todo, 5).with_feature("ui");
        let mut state = TaskEditState::new(&task);
        state.focus = EditField::Priority;
        state.clear_field();
        state.insert_str("12");
        let patch = state.to_patch().unwrap();
        assert_eq!(
            patch,
            TaskPatch {
                priority: Some(12),
                ..Default::default()
            }
        );
    }

    #[test]
    fn task_edit_clearing_feature_sends_null() {
        let task = Task::new("t", "p", "Title", TaskStatus::Todo, 5).with_feature("ui");
        let mut state = TaskEditState::new(&task);
        state.focus = EditField::Feature;
        state.clear_field();
        assert_eq!(state.to_patch().unwrap().feature, Some(None));
    }

    #[test]
    fn task_edit_rejects_bad_input() {
        let task = Task::new("t", "p", "Title", TaskStatus::Todo, 5);
        let mut state = TaskEditState::new(&task);
        state.focus_prev();
        assert_eq!(state.focus, EditField::Feature);
        state.focus = EditField::Priority;
        state.insert_str("x");
        assert!(matches!(state.to_patch(), Err(ValidationError::InvalidPriority(_))));

        let mut state = TaskEditState::new(&task);
        state.clear_field();
        assert_eq!(state.to_patch(), Err(ValidationError::EmptyTitle));

        let state = TaskEditState::new(&task);
        assert_eq!(state.to_patch(), Err(ValidationError::Empty));
    }

    #[test]
    fn feature_select_reflects_current_filter() {
        let tags = vec!["auth".to_string(), "ui".to_string()];
        let state = FeatureSelectState::new(&tags, None);
        assert!(state.entries.values().all(|v| *v));

        let mut filter = FeatureFilter::new();
        filter.insert("ui".into(), true);
        let mut state = FeatureSelectState::new(&tags, Some(&filter));
        assert_eq!(state.entries.get("auth"), Some(&false));
        state.toggle();
        assert_eq!(state.entries.get("auth"), Some(&true));
        state.set_all(false);
        assert!(state.entries.values().all(|v| !*v));
    }
}
