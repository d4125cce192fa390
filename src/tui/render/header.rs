use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::TaskStatus;
use crate::tui::app::App;
use crate::util::unicode;

/// Render the header row: scope, sort, filters, and connection state
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let mut left: Vec<Span> = vec![
        Span::styled(
            format!(" {}", app.domain.scope_label()),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {} tasks", app.visible_len()), dim),
        Span::styled(
            format!("  sort: {}", app.domain.sort_mode.label()),
            dim,
        ),
    ];

    if !app.domain.status_filter.all_visible() {
        let shown: Vec<&str> = TaskStatus::ALL
            .iter()
            .filter(|s| app.domain.status_filter.is_visible(**s))
            .map(|s| s.as_str())
            .collect();
        left.push(Span::styled(format!("  status: {}", shown.join(",")), dim));
    }
    if let Some(filter) = &app.domain.feature_filter {
        let shown: Vec<&str> = filter
            .iter()
            .filter(|(_, on)| **on)
            .map(|(tag, _)| tag.as_str())
            .collect();
        let label = if shown.is_empty() { "none".to_string() } else { shown.join(",") };
        left.push(Span::styled(format!("  feature: {}", label), dim));
    }

    let right = if app.domain.loading {
        let pending = app.domain.ledger.in_flight();
        let text = if pending > 0 {
            format!("{} ({} pending)\u{2026} ", app.domain.loading_message, pending)
        } else {
            format!("{}\u{2026} ", app.domain.loading_message)
        };
        Span::styled(text, Style::default().fg(app.theme.yellow).bg(bg))
    } else if app.domain.connected {
        Span::styled("\u{25CF} online ", Style::default().fg(app.theme.green).bg(bg))
    } else {
        Span::styled("\u{25CB} offline ", Style::default().fg(app.theme.red).bg(bg))
    };

    let used: usize = left.iter().map(|s| unicode::display_width(&s.content)).sum();
    let right_w = unicode::display_width(&right.content);
    if used + right_w < width {
        left.push(Span::styled(" ".repeat(width - used - right_w), Style::default().bg(bg)));
        left.push(right);
    }

    let paragraph = Paragraph::new(Line::from(left)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
