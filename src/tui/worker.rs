//! Runs commands off the dispatcher thread. Each command yields exactly one
//! message; workers never touch app state.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, warn};

use crate::io::client::Repository;
use crate::io::events::PushEvent;

use super::message::{Command, Msg};

/// Push receiver shared by successive `ListenPush` commands
pub type PushSource = Arc<Mutex<Receiver<PushEvent>>>;

/// Clipboard handle kept alive for the session. Some platforms drop the
/// clipboard contents when the owning handle is dropped.
pub type ClipboardSlot = Arc<Mutex<Option<arboard::Clipboard>>>;

/// Execute one command to completion, blocking the calling thread
pub fn execute(
    command: Command,
    repo: &dyn Repository,
    push: Option<&PushSource>,
    clipboard: &ClipboardSlot,
) -> Msg {
    match command {
        Command::FetchTasks { seq, query } => Msg::TasksLoaded {
            seq,
            result: repo.list_tasks(&query),
        },
        Command::FetchProjects => Msg::ProjectsLoaded {
            result: repo.list_projects(),
        },
        Command::UpdateTask { seq, id, patch } => {
            let result = repo.update_task(&id, &patch);
            Msg::TaskUpdated { seq, id, result }
        }
        Command::DeleteTask { seq, id } => {
            let result = repo.delete_task(&id);
            Msg::TaskDeleted { seq, id, result }
        }
        Command::ScheduleTick { after } => {
            thread::sleep(after);
            Msg::Tick
        }
        Command::ListenPush => {
            let Some(source) = push else {
                return Msg::PushClosed;
            };
            let received = match source.lock() {
                Ok(rx) => rx.recv().ok(),
                Err(_) => None,
            };
            match received {
                Some(event) => Msg::Push(event),
                None => Msg::PushClosed,
            }
        }
        Command::CopyToClipboard { label, text } => Msg::Copied {
            label,
            result: copy_text(clipboard, text),
        },
    }
}

fn copy_text(slot: &ClipboardSlot, text: String) -> Result<(), String> {
    let mut guard = slot
        .lock()
        .map_err(|_| "clipboard unavailable".to_string())?;
    if guard.is_none() {
        *guard = Some(arboard::Clipboard::new().map_err(|e| e.to_string())?);
    }
    match guard.as_mut() {
        Some(clipboard) => clipboard.set_text(text).map_err(|e| e.to_string()),
        None => Err("clipboard unavailable".to_string()),
    }
}

/// Spawns a thread per command and posts the resulting message back
pub struct Worker {
    repo: Arc<dyn Repository>,
    push: Option<PushSource>,
    clipboard: ClipboardSlot,
    tx: Sender<Msg>,
}

impl Worker {
    pub fn new(repo: Arc<dyn Repository>, push: Option<Receiver<PushEvent>>, tx: Sender<Msg>) -> Self {
        Worker {
            repo,
            push: push.map(|rx| Arc::new(Mutex::new(rx))),
            clipboard: Arc::new(Mutex::new(None)),
            tx,
        }
    }

    pub fn spawn(&self, command: Command) {
        debug!(command = command.name(), "spawning command");
        let repo = Arc::clone(&self.repo);
        let push = self.push.clone();
        let clipboard = Arc::clone(&self.clipboard);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let msg = execute(command, repo.as_ref(), push.as_ref(), &clipboard);
            if tx.send(msg).is_err() {
                warn!("dispatcher gone; dropping command result");
            }
        });
    }
}
