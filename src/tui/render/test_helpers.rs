use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::client::{Repository, TaskQuery};
use crate::io::memory::MemoryRepository;
use crate::model::AppConfig;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Render the whole screen for `app`
pub fn render_app(app: &App, w: u16, h: u16) -> String {
    render_to_string(w, h, |frame, _| super::render(frame, app))
}

/// An App loaded with the demo board, sized to the default test terminal.
pub fn sample_app() -> App {
    let repo = MemoryRepository::demo();
    let mut app = App::new(&AppConfig::default(), false);
    app.view.width = TERM_W;
    app.view.height = TERM_H;
    let tasks = repo
        .list_tasks(&TaskQuery {
            include_closed: true,
            ..Default::default()
        })
        .unwrap();
    let projects = repo.list_projects().unwrap();
    app.domain.projects = projects;
    app.domain.connected = true;
    app.domain.loaded = true;
    app.reflow(|app| app.domain.tasks = tasks);
    app
}
