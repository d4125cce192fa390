use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::Task;
use crate::tui::app::App;
use crate::tui::state::Panel;
use crate::util::unicode;

use super::{push_highlighted_spans, search_regex};

/// Width of the status column, "REVIEW" plus a space
const STATUS_COL: usize = 7;

/// First row to draw so that `selected` stays in a window of `rows`
pub(super) fn scroll_offset(selected: usize, rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    (selected + 1).saturating_sub(rows)
}

/// Render the visible task list. Rows that miss the active search are dimmed.
pub fn render_task_list(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let focused = app.view.panel == Panel::List;
    let border_color = if focused { app.theme.highlight } else { app.theme.dim };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Tasks ", Style::default().fg(app.theme.text_bright).bg(bg)))
        .border_style(Style::default().fg(border_color).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.visible_len() == 0 {
        let message = if app.domain.loaded {
            " No tasks"
        } else {
            " Loading tasks\u{2026}"
        };
        let empty = Paragraph::new(message).style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, inner);
        return;
    }

    let rows = inner.height as usize;
    let width = inner.width as usize;
    let offset = scroll_offset(app.view.selected, rows);
    let search_re = search_regex(app);
    let searching = search_re.is_some();

    let lines: Vec<Line> = app
        .visible_tasks()
        .enumerate()
        .skip(offset)
        .take(rows)
        .map(|(row, task)| {
            let dimmed = searching && !app.view.search.is_match(row);
            task_line(app, task, row == app.view.selected, dimmed, search_re.as_ref(), width)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}

fn task_line<'a>(
    app: &App,
    task: &Task,
    selected: bool,
    dimmed: bool,
    search_re: Option<&regex::Regex>,
    width: usize,
) -> Line<'a> {
    let theme = &app.theme;
    let row_bg = if selected { theme.selection_bg } else { theme.background };
    let base = Style::default().bg(row_bg);
    let fg = |color: ratatui::style::Color| {
        if dimmed {
            base.fg(theme.dim)
        } else {
            base.fg(color)
        }
    };

    let mut spans: Vec<Span> = Vec::new();
    spans.push(Span::styled(
        if selected { "\u{25B6} " } else { "  " },
        fg(theme.highlight),
    ));
    spans.push(Span::styled(
        format!("{:<w$}", task.status.label(), w = STATUS_COL),
        fg(theme.status_color(task.status)).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(format!("{:>4} ", task.priority), fg(theme.dim)));

    let feature = task
        .feature
        .as_deref()
        .map(|f| (format!(" #{}", f), theme.feature_color(f)));
    let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    let feature_w = feature.as_ref().map_or(0, |(text, _)| unicode::display_width(text));
    let title_w = width.saturating_sub(used + feature_w);
    let title = unicode::truncate_to_width(&task.title, title_w);

    let title_style = if selected {
        fg(theme.text_bright).add_modifier(Modifier::BOLD)
    } else {
        fg(theme.text)
    };
    let highlight = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);
    let re = if dimmed { None } else { search_re };
    push_highlighted_spans(&mut spans, &title, title_style, highlight, re);

    if let Some((text, color)) = feature {
        spans.push(Span::styled(text, fg(color)));
    }

    let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), base));
    }
    Line::from(spans)
}
