use unicode_segmentation::UnicodeSegmentation;

/// Most search queries kept in history
pub const HISTORY_CAP: usize = 50;

/// Positions (into `titles`) whose text contains `query`, ignoring case.
/// An empty query matches nothing.
pub fn find_matches<S: AsRef<str>>(titles: &[S], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    titles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_ref().to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// Search activation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Inactive,
    /// Query is being typed; matches follow every keystroke
    Typing,
    /// Query is frozen; matches are cached until the visible list changes
    Committed,
}

/// Search input, committed query, and the cached match set
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub phase: SearchPhase,
    /// Raw input buffer while typing
    pub input: String,
    /// Last committed query
    pub query: String,
    /// Committed query at the moment typing began, restored by cancel
    prior_query: Option<String>,
    /// Ordered indices into the visible list
    pub matches: Vec<usize>,
    /// Position within `matches` of the current match
    pub match_cursor: usize,
    /// Position in history while browsing with Up/Down
    pub history_index: Option<usize>,
    /// Input typed before history browsing started
    draft: String,
}

impl SearchState {
    pub fn is_active(&self) -> bool {
        self.phase != SearchPhase::Inactive
    }

    pub fn is_typing(&self) -> bool {
        self.phase == SearchPhase::Typing
    }

    /// Enter typing. When a query is already committed it is preloaded, not cleared.
    pub fn activate(&mut self) {
        self.prior_query = match self.phase {
            SearchPhase::Committed => Some(self.query.clone()),
            _ => None,
        };
        if self.phase != SearchPhase::Typing {
            self.input = self.query.clone();
        }
        self.phase = SearchPhase::Typing;
        self.history_index = None;
        self.draft.clear();
    }

    /// The query that currently drives matching
    pub fn active_query(&self) -> Option<&str> {
        let q = match self.phase {
            SearchPhase::Inactive => return None,
            SearchPhase::Typing => self.input.as_str(),
            SearchPhase::Committed => self.query.as_str(),
        };
        (!q.is_empty()).then_some(q)
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
        self.stop_history_browse();
    }

    pub fn push_str(&mut self, text: &str) {
        self.input
            .extend(text.chars().filter(|c| !c.is_control()));
        self.stop_history_browse();
    }

    /// Delete the last grapheme
    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.input.grapheme_indices(true).next_back() {
            self.input.truncate(idx);
        }
        self.stop_history_browse();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.stop_history_browse();
    }

    fn stop_history_browse(&mut self) {
        if self.history_index.is_some() {
            self.history_index = None;
            self.draft.clear();
        }
    }

    /// Freeze the typed query. Committing an empty buffer clears the search.
    /// Returns the committed query, if any.
    pub fn commit(&mut self) -> Option<String> {
        if self.input.is_empty() {
            self.clear();
            return None;
        }
        self.query = std::mem::take(&mut self.input);
        self.phase = SearchPhase::Committed;
        self.prior_query = None;
        self.history_index = None;
        Some(self.query.clone())
    }

    /// Abandon typing and restore whatever was committed before it began
    pub fn cancel(&mut self) {
        self.input.clear();
        self.history_index = None;
        match self.prior_query.take() {
            Some(prior) if !prior.is_empty() => {
                self.query = prior;
                self.phase = SearchPhase::Committed;
            }
            _ => self.clear(),
        }
    }

    /// Drop the query and the match set
    pub fn clear(&mut self) {
        self.phase = SearchPhase::Inactive;
        self.input.clear();
        self.query.clear();
        self.prior_query = None;
        self.matches.clear();
        self.match_cursor = 0;
        self.history_index = None;
        self.draft.clear();
    }

    /// Recompute the match set against the current visible titles
    pub fn recompute<S: AsRef<str>>(&mut self, titles: &[S]) {
        self.matches = match self.active_query() {
            Some(q) => find_matches(titles, q),
            None => Vec::new(),
        };
        self.match_cursor = self.match_cursor.min(self.matches.len().saturating_sub(1));
    }

    /// First match at or after `from`, wrapping to the first match
    pub fn first_match_from(&mut self, from: usize) -> Option<usize> {
        let pos = self
            .matches
            .iter()
            .position(|&m| m >= from)
            .or(if self.matches.is_empty() { None } else { Some(0) })?;
        self.match_cursor = pos;
        Some(self.matches[pos])
    }

    /// Next match after `selected`, wrapping from the last to the first
    pub fn next_match(&mut self, selected: usize) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let pos = self
            .matches
            .iter()
            .position(|&m| m > selected)
            .unwrap_or(0);
        self.match_cursor = pos;
        Some(self.matches[pos])
    }

    /// Previous match before `selected`, wrapping from the first to the last
    pub fn prev_match(&mut self, selected: usize) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let pos = self
            .matches
            .iter()
            .rposition(|&m| m < selected)
            .unwrap_or(self.matches.len() - 1);
        self.match_cursor = pos;
        Some(self.matches[pos])
    }

    pub fn is_match(&self, index: usize) -> bool {
        self.matches.binary_search(&index).is_ok()
    }

    /// Step to an older history entry (Up). Returns whether the input changed.
    pub fn history_older(&mut self, history: &SearchHistory) -> bool {
        let next = match self.history_index {
            None => 0,
            Some(i) => i + 1,
        };
        let Some(entry) = history.get(next) else {
            return false;
        };
        if self.history_index.is_none() {
            self.draft = self.input.clone();
        }
        self.history_index = Some(next);
        self.input = entry.to_string();
        true
    }

    /// Step to a newer history entry (Down), ending at the draft
    pub fn history_newer(&mut self, history: &SearchHistory) -> bool {
        match self.history_index {
            None => false,
            Some(0) => {
                self.history_index = None;
                self.input = std::mem::take(&mut self.draft);
                true
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.input = history.get(i - 1).unwrap_or_default().to_string();
                true
            }
        }
    }
}

/// Bounded, most-recent-first list of unique queries
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: Vec<String>,
    cap: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        SearchHistory::with_capacity(HISTORY_CAP)
    }
}

impl SearchHistory {
    pub fn with_capacity(cap: usize) -> Self {
        SearchHistory {
            entries: Vec::new(),
            cap,
        }
    }

    /// Move `query` to the front, dropping an older duplicate and the oldest overflow
    pub fn record(&mut self, query: &str) {
        if query.is_empty() {
            return;
        }
        self.entries.retain(|q| q != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.cap);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
