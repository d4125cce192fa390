use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::state::ViewMode;

use super::centered;

/// Render the help overlay (toggled with F1 or ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, scroll: usize, area: Rect) {
    let overlay_area = centered(60, area.height.saturating_sub(4), area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(help_lines(app))
        .block(block)
        .style(Style::default().bg(bg))
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));

    frame.render_widget(paragraph, overlay_area);
}

/// Number of lines in the help text for the current mode
pub fn content_height(app: &App) -> usize {
    help_lines(app).len()
}

fn help_lines(app: &App) -> Vec<Line<'static>> {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    // Context-sensitive help
    match app.view.mode {
        ViewMode::Tasks => {
            lines.push(Line::from(Span::styled(" Navigation", header_style)));
            add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move cursor up/down", key_style, desc_style);
            add_binding(&mut lines, " J/K", "Move 4 rows", key_style, desc_style);
            add_binding(&mut lines, " Ctrl+D/U", "Half page down/up", key_style, desc_style);
            add_binding(&mut lines, " g/G", "Jump to top/bottom", key_style, desc_style);
            add_binding(&mut lines, " Enter/Tab", "Open details / switch panel", key_style, desc_style);
            lines.push(Line::from(""));

            lines.push(Line::from(Span::styled(" Search", header_style)));
            add_binding(&mut lines, " /", "Search titles", key_style, desc_style);
            add_binding(&mut lines, " n/N", "Next/previous match", key_style, desc_style);
            add_binding(&mut lines, " \u{2191}\u{2193}", "History (while typing)", key_style, desc_style);
            lines.push(Line::from(""));

            lines.push(Line::from(Span::styled(" Tasks", header_style)));
            add_binding(&mut lines, " s", "Change status", key_style, desc_style);
            add_binding(&mut lines, " 1-4", "Set todo/doing/review/done", key_style, desc_style);
            add_binding(&mut lines, " e", "Edit title, priority, feature", key_style, desc_style);
            add_binding(&mut lines, " d", "Delete task", key_style, desc_style);
            add_binding(&mut lines, " y/Y", "Copy id/title", key_style, desc_style);
            lines.push(Line::from(""));

            lines.push(Line::from(Span::styled(" View", header_style)));
            add_binding(&mut lines, " o/O", "Cycle sort mode", key_style, desc_style);
            add_binding(&mut lines, " f", "Filter by feature", key_style, desc_style);
            add_binding(&mut lines, " v", "Filter by status", key_style, desc_style);
            add_binding(&mut lines, " p/a", "Pick project / all projects", key_style, desc_style);
            lines.push(Line::from(""));
        }
        ViewMode::ProjectSelect => {
            lines.push(Line::from(Span::styled(" Projects", header_style)));
            add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move cursor", key_style, desc_style);
            add_binding(&mut lines, " Enter", "Show project", key_style, desc_style);
            add_binding(&mut lines, " Esc/q", "Back to tasks", key_style, desc_style);
            lines.push(Line::from(""));
        }
    }

    // Global keys
    lines.push(Line::from(Span::styled(" Global", header_style)));
    add_binding(&mut lines, " r/F5", "Refresh", key_style, desc_style);
    add_binding(&mut lines, " Esc", "Dismiss error / close / clear", key_style, desc_style);
    add_binding(&mut lines, " ?/F1", "Toggle this help", key_style, desc_style);
    add_binding(&mut lines, " q", "Quit", key_style, desc_style);
    add_binding(&mut lines, " Ctrl+C", "Quit (immediate)", key_style, desc_style);
    lines
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 14;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}
