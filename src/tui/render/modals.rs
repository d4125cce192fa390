use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::model::TaskStatus;
use crate::tui::app::App;
use crate::tui::modal::{
    ConfirmState, EditField, FeatureSelectState, Modal, StatusEditState, TaskEditState,
};
use crate::tui::theme::Theme;

use super::centered;

/// Render any modal other than help as a centered popup
pub fn render_modal(frame: &mut Frame, app: &App, modal: &Modal, area: Rect) {
    let theme = &app.theme;
    let (title, lines) = match modal {
        Modal::StatusEdit(state) => (" Status ", status_edit_lines(theme, state)),
        Modal::Confirm(state) => (" Confirm ", confirm_lines(theme, state)),
        Modal::TaskEdit(state) => (" Edit task ", task_edit_lines(theme, state)),
        Modal::FeatureSelect(state) => (" Features ", feature_lines(theme, state)),
        Modal::StatusFilter { cursor } => (" Show statuses ", status_filter_lines(app, *cursor)),
        Modal::Help { .. } => return,
    };

    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = centered(50, height, area);
    let bg = theme.background;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(theme.text_bright).bg(bg)))
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .style(Style::default().bg(bg));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(bg)),
        popup,
    );
}

/// One selectable row: cursor indicator plus label
fn choice_line<'a>(theme: &Theme, label: String, selected: bool, color: ratatui::style::Color) -> Line<'a> {
    let bg = if selected { theme.selection_bg } else { theme.background };
    let mut style = Style::default().fg(color).bg(bg);
    if selected {
        style = style.add_modifier(Modifier::BOLD);
    }
    let indicator = if selected { " \u{25B6} " } else { "   " };
    Line::from(vec![
        Span::styled(indicator, style),
        Span::styled(label, style),
    ])
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn hint_line<'a>(theme: &Theme, text: &'a str) -> Line<'a> {
    Line::from(Span::styled(text, Style::default().fg(theme.dim).bg(theme.background)))
}

fn status_edit_lines<'a>(theme: &Theme, state: &StatusEditState) -> Vec<Line<'a>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", state.title),
            Style::default().fg(theme.text_bright).bg(theme.background),
        )),
        Line::from(""),
    ];
    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        lines.push(choice_line(
            theme,
            format!("{} {}", i + 1, status.as_str()),
            i == state.cursor,
            theme.status_color(*status),
        ));
    }
    lines.push(Line::from(""));
    lines.push(hint_line(theme, " Enter apply  Esc cancel"));
    lines
}

fn confirm_lines<'a>(theme: &Theme, state: &ConfirmState) -> Vec<Line<'a>> {
    let bg = theme.background;
    let button = |label: &'static str, focused: bool| {
        let style = if focused {
            Style::default()
                .fg(theme.background)
                .bg(theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text).bg(bg)
        };
        Span::styled(label, style)
    };
    vec![
        Line::from(Span::styled(
            format!(" {}", state.prompt()),
            Style::default().fg(theme.text_bright).bg(bg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   ", Style::default().bg(bg)),
            button(" Yes ", state.yes_focused),
            Span::styled("  ", Style::default().bg(bg)),
            button(" No ", !state.yes_focused),
        ]),
        Line::from(""),
        hint_line(theme, " y/n  \u{2190}\u{2192} choose  Enter confirm"),
    ]
}

fn task_edit_lines<'a>(theme: &Theme, state: &TaskEditState) -> Vec<Line<'a>> {
    let bg = theme.background;
    let mut lines = Vec::new();
    for field in EditField::ALL {
        let focused = field == state.focus;
        let label_style = if focused {
            Style::default().fg(theme.highlight).bg(bg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim).bg(bg)
        };
        let mut spans = vec![
            Span::styled(format!(" {:<10}", field.label()), label_style),
            Span::styled(
                state.buffer(field).to_string(),
                Style::default().fg(theme.text_bright).bg(bg),
            ),
        ];
        if focused {
            spans.push(Span::styled("\u{258C}", Style::default().fg(theme.highlight).bg(bg)));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(theme.red).bg(bg),
        )));
    }
    lines.push(hint_line(theme, " Tab next field  Enter save  Esc cancel"));
    lines
}

fn feature_lines<'a>(theme: &Theme, state: &FeatureSelectState) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = state
        .entries
        .iter()
        .enumerate()
        .map(|(i, (tag, checked))| {
            choice_line(
                theme,
                format!("{} {}", checkbox(*checked), tag),
                i == state.cursor,
                theme.feature_color(tag),
            )
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(hint_line(theme, " Space toggle  a/n all/none  c clear  Enter apply"));
    lines
}

fn status_filter_lines<'a>(app: &App, cursor: usize) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let mut lines: Vec<Line> = TaskStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let visible = app.domain.status_filter.is_visible(*status);
            choice_line(
                theme,
                format!("{} {} {}", checkbox(visible), i + 1, status.as_str()),
                i == cursor,
                theme.status_color(*status),
            )
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(hint_line(theme, " Space/1-4 toggle  Esc close"));
    lines
}
