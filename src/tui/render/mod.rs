pub mod detail_view;
pub mod header;
pub mod help_overlay;
pub mod modals;
pub mod project_picker;
pub mod status_row;
pub mod task_list;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::Regex;

use super::app::App;
use super::modal::Modal;
use super::state::{Panel, ViewMode};

/// Main render function: lays out the screen and dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: header (1 row) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    header::render_header(frame, app, chunks[0]);

    match app.view.panel {
        Panel::Details if app.selected_task().is_some() => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(chunks[1]);
            task_list::render_task_list(frame, app, columns[0]);
            detail_view::render_detail_view(frame, app, columns[1]);
        }
        _ => task_list::render_task_list(frame, app, chunks[1]),
    }

    if app.view.mode == ViewMode::ProjectSelect {
        project_picker::render_project_picker(frame, app, chunks[1]);
    }

    // Modal overlays (rendered on top of everything)
    match app.modals.active() {
        Some(Modal::Help { scroll }) => {
            help_overlay::render_help_overlay(frame, app, *scroll, area)
        }
        Some(modal) => modals::render_modal(frame, app, modal, area),
        None => {}
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

/// Case-insensitive regex for highlighting the active search query
pub(super) fn search_regex(app: &App) -> Option<Regex> {
    let query = app.view.search.active_query()?;
    Regex::new(&format!("(?i){}", regex::escape(query))).ok()
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let re = match search_re {
        Some(r) => r,
        None => {
            spans.push(Span::styled(text.to_string(), base_style));
            return;
        }
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[m.start()..m.end()].to_string(),
            highlight_style,
        ));
        last_end = m.end();
    }
    if last_end < text.len() || last_end == 0 {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}

/// A rectangle of at most `width` x `height` centered in `area`
pub(super) fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::{TERM_H, TERM_W, render_app, sample_app};
    use super::*;

    #[test]
    fn highlight_splits_at_matches() {
        let re = Regex::new("(?i)auth").ok();
        let mut spans = Vec::new();
        push_highlighted_spans(
            &mut spans,
            "OAuth flow",
            Style::default(),
            Style::default(),
            re.as_ref(),
        );
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["O", "Auth", " flow"]);
    }

    #[test]
    fn search_regex_escapes_query() {
        let mut app = sample_app();
        app.view.search.activate();
        app.view.search.push_str("c++");
        let re = search_regex(&app);
        assert!(re.is_some_and(|re| re.is_match("C++ bindings")));
    }

    #[test]
    fn full_screen_shows_header_list_and_status() {
        let app = sample_app();
        let output = render_app(&app, TERM_W, TERM_H);
        assert!(output.contains("All projects"));
        assert!(output.contains("Add authentication flow"));
        assert!(output.contains("F1 help"));
    }

    #[test]
    fn details_panel_opens_beside_list() {
        let mut app = sample_app();
        app.view.panel = Panel::Details;
        let output = render_app(&app, 100, TERM_H);
        assert!(output.contains("Details"));
        assert!(output.contains("T-101"));
    }
}
