use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::search::SearchPhase;
use crate::tui::app::App;
use crate::tui::state::ViewMode;
use crate::util::unicode;

/// Render the status row (bottom of screen). Priority: search prompt, error
/// banner, notice, committed search, key hints.
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let search = &app.view.search;

    let (mut spans, hint): (Vec<Span>, &str) = if search.phase == SearchPhase::Typing {
        // Search prompt: /pattern▌
        (
            vec![
                Span::styled(
                    format!("/{}", search.input),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ],
            "Enter search  Esc cancel",
        )
    } else if let Some(error) = &app.domain.last_error {
        (
            vec![Span::styled(
                format!(" {} ", error),
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(ratatui::style::Color::Rgb(0x8D, 0x0B, 0x0B))
                    .add_modifier(Modifier::BOLD),
            )],
            "Esc dismiss",
        )
    } else if let Some(notice) = &app.view.notice {
        (
            vec![Span::styled(format!(" {}", notice), Style::default().fg(app.theme.green).bg(bg))],
            "",
        )
    } else if search.phase == SearchPhase::Committed {
        let count = search.matches.len();
        let position = if count == 0 { 0 } else { search.match_cursor + 1 };
        (
            vec![Span::styled(
                format!("/{}  [{}/{}]", search.query, position, count),
                dim,
            )],
            "n/N next/prev",
        )
    } else {
        let hint = match app.view.mode {
            ViewMode::Tasks => "/ search  s status  e edit  p projects  F1 help",
            ViewMode::ProjectSelect => "Enter choose  Esc back",
        };
        (Vec::new(), hint)
    };

    let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    let hint_width = unicode::display_width(hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, dim));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
