use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode;

use super::centered;
use super::task_list::scroll_offset;

/// Render the project picker popup over the task list
pub fn render_project_picker(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let bg_style = Style::default().bg(bg);

    // Sizing: 60% width, min 30, max 62 (inner 60 + 2 borders)
    let target_w = (area.width as f32 * 0.6) as u16;
    let popup_w = target_w.clamp(30, 62).min(area.width);
    let popup_h = (app.project_entries() as u16 + 2).min(area.height);
    let popup = centered(popup_w, popup_h, area);
    let inner_w = popup_w.saturating_sub(2) as usize;
    let rows = popup_h.saturating_sub(2) as usize;

    let entries = std::iter::once((None, "All projects"))
        .chain(
            app.domain
                .projects
                .iter()
                .map(|p| (Some(p.id.as_str()), p.title.as_str())),
        );
    let current = app.domain.selected_project.as_deref();
    let cursor = app.view.project_cursor;

    let lines: Vec<Line> = entries
        .enumerate()
        .skip(scroll_offset(cursor, rows))
        .take(rows)
        .map(|(i, (id, title))| {
            let is_selected = i == cursor;
            let row_bg = if is_selected { theme.selection_bg } else { bg };
            let style = if is_selected {
                Style::default()
                    .fg(theme.text_bright)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text).bg(row_bg)
            };
            // Cursor indicator: " ▶ " on selected, "   " otherwise
            let indicator = if is_selected { " \u{25B6} " } else { "   " };
            let marker = if id == current { " *" } else { "" };
            let name = unicode::truncate_to_width(title, inner_w.saturating_sub(5));
            let mut spans = vec![
                Span::styled(indicator, style),
                Span::styled(name, style),
                Span::styled(marker, Style::default().fg(theme.highlight).bg(row_bg)),
            ];
            let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
            if used < inner_w {
                spans.push(Span::styled(" ".repeat(inner_w - used), Style::default().bg(row_bg)));
            }
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Projects ", Style::default().fg(theme.text_bright).bg(bg)))
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .style(bg_style);

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block).style(bg_style), popup);
}
