use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::model::Task;
use crate::tui::app::App;
use crate::tui::state::Panel;

/// Labelled metadata rows shown under the title
fn field_rows(app: &App, task: &Task) -> Vec<(&'static str, String)> {
    let project = app
        .domain
        .project_title(&task.project_id)
        .unwrap_or(&task.project_id)
        .to_string();
    vec![
        ("id", task.id.clone()),
        ("status", task.status.as_str().to_string()),
        ("priority", task.priority.to_string()),
        ("feature", task.feature.clone().unwrap_or_else(|| "(none)".into())),
        ("project", project),
        ("assignee", task.assignee.clone().unwrap_or_else(|| "(none)".into())),
        ("created", task.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ("updated", task.updated_at.format("%Y-%m-%d %H:%M").to_string()),
    ]
}

const FIELD_COUNT: usize = 8;

/// Unwrapped line count of the details panel for `task`, used to bound
/// scrolling
pub fn content_height(task: &Task) -> usize {
    let description = task.description.lines().count().max(1);
    // title, blank, fields, blank, description
    2 + FIELD_COUNT + 1 + description
}

/// Render the details panel for the selected task
pub fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let focused = app.view.panel == Panel::Details;
    let border_color = if focused { app.theme.highlight } else { app.theme.dim };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Details ", Style::default().fg(app.theme.text_bright).bg(bg)))
        .border_style(Style::default().fg(border_color).bg(bg))
        .style(Style::default().bg(bg));

    let Some(task) = app.selected_task() else {
        let empty = Paragraph::new(" No task selected")
            .style(Style::default().fg(app.theme.dim).bg(bg))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (label, value) in field_rows(app, task) {
        let value_style = match label {
            "status" => Style::default().fg(app.theme.status_color(task.status)).bg(bg),
            "feature" if task.feature.is_some() => Style::default()
                .fg(app.theme.feature_color(&value))
                .bg(bg),
            _ => text_style,
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<10}", label), dim_style),
            Span::styled(value, value_style),
        ]));
    }

    lines.push(Line::from(""));
    if task.description.trim().is_empty() {
        lines.push(Line::from(Span::styled("(no description)", dim_style)));
    } else {
        for line in task.description.lines() {
            lines.push(Line::from(Span::styled(line.to_string(), text_style)));
        }
    }

    let scroll = app.view.details_scroll.min(u16::MAX as usize) as u16;
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}
