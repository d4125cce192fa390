use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info};

use crate::io::client::Repository;
use crate::io::events::PushEvent;
use crate::model::{AppConfig, Task};
use crate::ops::{pipeline, selection};

use super::dispatch::dispatch;
use super::message::{Command, Msg};
use super::modal::ModalCoordinator;
use super::render;
use super::state::{DomainStore, PresentationStore};
use super::theme::Theme;
use super::worker::Worker;

/// Main application state
pub struct App {
    pub domain: DomainStore,
    pub view: PresentationStore,
    pub modals: ModalCoordinator,
    pub theme: Theme,
    /// Zero disables automatic refresh
    pub poll_interval: Duration,
    pub push_enabled: bool,
    pub should_quit: bool,
    /// Cached pipeline output: indices into `domain.tasks`
    visible: Vec<usize>,
}

impl App {
    pub fn new(config: &AppConfig, push_enabled: bool) -> Self {
        let mut app = App {
            domain: DomainStore::new(config),
            view: PresentationStore::default(),
            modals: ModalCoordinator::default(),
            theme: Theme::from_config(&config.ui),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            push_enabled,
            should_quit: false,
            visible: Vec::new(),
        };
        app.recompute_visible();
        app
    }

    /// Commands issued once at session start
    pub fn startup_commands(&mut self) -> Vec<Command> {
        let mut commands = super::dispatch::refresh(self, "Loading tasks");
        if !self.poll_interval.is_zero() {
            commands.push(Command::ScheduleTick {
                after: self.poll_interval,
            });
        }
        if self.push_enabled {
            commands.push(Command::ListenPush);
        }
        commands
    }

    /// Visible list as indices into `domain.tasks`
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_task(&self, pos: usize) -> Option<&Task> {
        self.visible.get(pos).and_then(|&i| self.domain.tasks.get(i))
    }

    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> {
        self.visible.iter().filter_map(|&i| self.domain.tasks.get(i))
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_task(self.view.selected)
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Run a mutation that may reorder or resize the visible list, keeping
    /// the selected task selected when it survives.
    pub fn reflow(&mut self, mutate: impl FnOnce(&mut App)) {
        let remembered = self.selected_id();
        mutate(self);
        self.recompute_visible();
        let ids: Vec<&str> = self.visible_tasks().map(|t| t.id.as_str()).collect();
        let resolved = selection::resolve(&ids, remembered.as_deref(), self.view.selected);
        if remembered.is_some() && ids.get(resolved).copied() != remembered.as_deref() {
            debug!(remembered = ?remembered, index = resolved, "selected task left the visible list");
        }
        self.view.selected = resolved;
        self.recompute_matches();
    }

    fn recompute_visible(&mut self) {
        self.visible = pipeline::visible_indices(&self.domain.tasks, &self.domain.prefs());
        self.view.selected = selection::clamp(self.view.selected, self.visible.len());
    }

    /// Rebuild the search match set against the current visible list
    pub fn recompute_matches(&mut self) {
        let titles: Vec<&str> = self
            .visible
            .iter()
            .filter_map(|&i| self.domain.tasks.get(i))
            .map(|t| t.title.as_str())
            .collect();
        self.view.search.recompute(&titles);
    }

    /// Entries in the project picker: "all projects" plus every project
    pub fn project_entries(&self) -> usize {
        self.domain.projects.len() + 1
    }

    /// Show a transient notice in the status row
    pub fn notify(&mut self, message: impl Into<String>) {
        self.view.notice = Some(message.into());
    }
}

/// Run the TUI against `repo` until the user quits
pub fn run(
    config: &AppConfig,
    repo: Arc<dyn Repository>,
    push: Option<Receiver<PushEvent>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config, push.is_some());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let (tx, rx) = mpsc::channel();
    spawn_input_reader(tx.clone());
    let worker = Worker::new(repo, push, tx);

    let size = terminal.size()?;
    let _ = dispatch(
        &mut app,
        Msg::Resize {
            width: size.width,
            height: size.height,
        },
    );
    for command in app.startup_commands() {
        worker.spawn(command);
    }
    info!(server = %config.server_url, poll = config.poll_interval_secs, "session started");

    let result = run_event_loop(&mut terminal, &mut app, &rx, &worker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    info!("session ended");

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &Receiver<Msg>,
    worker: &Worker,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        // Block for one message, then drain whatever else queued up before redrawing.
        let first = rx.recv()?;
        for msg in std::iter::once(first).chain(rx.try_iter()) {
            for command in dispatch(app, msg) {
                worker.spawn(command);
            }
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

/// Forward terminal events into the message queue from a dedicated thread
fn spawn_input_reader(tx: Sender<Msg>) {
    thread::spawn(move || {
        loop {
            let msg = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Msg::Key(key),
                Ok(Event::Key(_)) => continue,
                Ok(Event::Resize(width, height)) => Msg::Resize { width, height },
                Ok(Event::Paste(text)) => Msg::Paste(text),
                Ok(_) => Msg::Ignored,
                Err(e) => {
                    debug!(error = %e, "terminal input closed");
                    return;
                }
            };
            if tx.send(msg).is_err() {
                return;
            }
        }
    });
}
