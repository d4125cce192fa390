use crate::io::client::TaskQuery;
use crate::model::{
    AppConfig, FeatureFilter, Project, SortMode, StatusFilter, StatusOrder, Task,
};
use crate::ops::pipeline::ViewPrefs;
use crate::ops::reconcile::EditLedger;
use crate::ops::search::{SearchHistory, SearchState};

/// Server-mirrored entities plus the user's view preferences.
///
/// Only the dispatcher writes here. Snapshots are replaced wholesale.
#[derive(Debug, Clone)]
pub struct DomainStore {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    /// `None` shows every project
    pub selected_project: Option<String>,
    pub status_filter: StatusFilter,
    /// `None` disables feature filtering
    pub feature_filter: Option<FeatureFilter>,
    pub sort_mode: SortMode,
    pub status_order: StatusOrder,
    pub connected: bool,
    pub loading: bool,
    pub loading_message: String,
    pub last_error: Option<String>,
    pub search_history: SearchHistory,
    pub ledger: EditLedger,
    /// Whether any task snapshot has arrived yet
    pub loaded: bool,
    seq: u64,
    /// Request sequence of the last applied task snapshot
    applied_seq: u64,
    pending_fetches: usize,
    /// Whether the last request from each source failed
    tasks_failing: bool,
    projects_failing: bool,
    /// Message of the most recent failure, to tell it apart from other banners
    last_failure: Option<String>,
}

/// Which half of the server a result came from. Edits and deletes count
/// as task traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Tasks,
    Projects,
}

impl DomainStore {
    pub fn new(config: &AppConfig) -> Self {
        DomainStore {
            tasks: Vec::new(),
            projects: Vec::new(),
            selected_project: config.default_project.clone(),
            status_filter: config.statuses,
            feature_filter: None,
            sort_mode: config.default_sort,
            status_order: config.status_order.clone(),
            connected: false,
            loading: false,
            loading_message: String::new(),
            last_error: None,
            search_history: SearchHistory::default(),
            ledger: EditLedger::default(),
            loaded: false,
            seq: 0,
            applied_seq: 0,
            pending_fetches: 0,
            tasks_failing: false,
            projects_failing: false,
            last_failure: None,
        }
    }

    /// Next value of the request sequence counter
    pub fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn prefs(&self) -> ViewPrefs<'_> {
        ViewPrefs {
            project: self.selected_project.as_deref(),
            statuses: &self.status_filter,
            features: self.feature_filter.as_ref(),
            sort: self.sort_mode,
            status_order: &self.status_order,
        }
    }

    /// Server-side query for the current project and status filters
    pub fn task_query(&self) -> TaskQuery {
        TaskQuery::for_view(self.selected_project.clone(), &self.status_filter)
    }

    pub fn begin_fetch(&mut self, message: &str) {
        self.pending_fetches += 1;
        self.loading = true;
        self.loading_message = message.to_string();
    }

    pub fn end_fetch(&mut self) {
        self.pending_fetches = self.pending_fetches.saturating_sub(1);
        if self.pending_fetches == 0 {
            self.loading = false;
            self.loading_message.clear();
        }
    }

    /// Whether a snapshot requested at `seq` is newer than the one on screen
    pub fn is_fresh(&self, seq: u64) -> bool {
        seq > self.applied_seq
    }

    pub fn mark_applied(&mut self, seq: u64) {
        self.applied_seq = seq;
    }

    fn failing(&mut self, source: Source) -> &mut bool {
        match source {
            Source::Tasks => &mut self.tasks_failing,
            Source::Projects => &mut self.projects_failing,
        }
    }

    /// A request from `source` failed: go offline and show the error
    pub fn record_failure(&mut self, source: Source, message: String) {
        *self.failing(source) = true;
        self.last_failure = Some(message.clone());
        self.connected = false;
        self.last_error = Some(message);
    }

    /// A request from `source` succeeded. The session is back online only
    /// once no source has an outstanding failure, and the banner is cleared
    /// only if it still shows a failure.
    pub fn record_success(&mut self, source: Source) {
        let recovered = std::mem::take(self.failing(source));
        if self.tasks_failing || self.projects_failing {
            return;
        }
        if recovered || !self.connected {
            if self.last_error.is_some() && self.last_error == self.last_failure {
                self.last_error = None;
            }
            self.last_failure = None;
        }
        self.connected = true;
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project_title(&self, id: &str) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.title.as_str())
    }

    /// Label for the current project scope
    pub fn scope_label(&self) -> String {
        match &self.selected_project {
            None => "All projects".to_string(),
            Some(id) => self.project_title(id).unwrap_or(id.as_str()).to_string(),
        }
    }
}

/// Which panel receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    List,
    Details,
}

/// Top-level interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Tasks,
    ProjectSelect,
}

/// Session-local view state. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct PresentationStore {
    pub panel: Panel,
    pub mode: ViewMode,
    pub search: SearchState,
    /// Selection when search typing began; live matching jumps from here
    pub search_origin: usize,
    /// Position in the current visible list, not a stable id
    pub selected: usize,
    /// Position in the project picker (0 = all projects)
    pub project_cursor: usize,
    pub details_scroll: usize,
    /// Transient status-row message, cleared on the next key
    pub notice: Option<String>,
    pub width: u16,
    pub height: u16,
}

/// Rows taken by the header, status row and list border
const CHROME_ROWS: u16 = 4;

impl PresentationStore {
    /// Rows available to the task list
    pub fn list_rows(&self) -> usize {
        self.height.saturating_sub(CHROME_ROWS).max(1) as usize
    }

    /// Half-page step, at least one row
    pub fn half_page(&self) -> usize {
        (self.list_rows() / 2).max(1)
    }
}
