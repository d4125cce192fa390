use std::io::{BufRead, BufReader};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::Task;

/// How long to wait before reconnecting a dropped event stream
const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Events pushed by the server, or synthesized by the stream reader for
/// connection changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    TaskCreated { task: Task },
    TaskUpdated { task: Task },
    TaskDeleted { id: String },
    Connected,
    Disconnected,
}

impl PushEvent {
    /// Whether this event changes the task set on the server
    pub fn touches_tasks(&self) -> bool {
        matches!(
            self,
            PushEvent::TaskCreated { .. } | PushEvent::TaskUpdated { .. } | PushEvent::TaskDeleted { .. }
        )
    }
}

/// Parse one Server-Sent Events line. Only `data:` lines carry events;
/// comments, `event:` and `id:` lines, and malformed payloads yield `None`.
pub fn parse_sse_line(line: &str) -> Option<PushEvent> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    match serde_json::from_str(data) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, "ignoring malformed push payload");
            None
        }
    }
}

/// Start reading the server's event stream on a background thread.
///
/// The returned receiver yields `Connected`/`Disconnected` around each
/// connection. The thread exits once the receiver is dropped.
pub fn start_event_stream(base_url: &str) -> mpsc::Receiver<PushEvent> {
    let (tx, rx) = mpsc::channel();
    let url = format!("{}/api/events", base_url.trim_end_matches('/'));

    thread::spawn(move || {
        // No request timeout: the stream is expected to stay open.
        let client = match Client::builder().timeout(None).build() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "could not build event stream client");
                return;
            }
        };
        loop {
            match client.get(&url).send() {
                Ok(response) if response.status().is_success() => {
                    if tx.send(PushEvent::Connected).is_err() {
                        return;
                    }
                    for line in BufReader::new(response).lines() {
                        let Ok(line) = line else { break };
                        if let Some(event) = parse_sse_line(&line)
                            && tx.send(event).is_err()
                        {
                            return;
                        }
                    }
                }
                Ok(response) => {
                    warn!(status = response.status().as_u16(), "event stream refused");
                }
                Err(e) => {
                    debug!(error = %e, "event stream unavailable");
                }
            }
            if tx.send(PushEvent::Disconnected).is_err() {
                return;
            }
            thread::sleep(RECONNECT_DELAY);
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;

    #[test]
    fn parses_task_events() {
        let line = r#"data: {"type":"task_updated","task":{"id":"t1","title":"A","status":"review"}}"#;
        match parse_sse_line(line) {
            Some(PushEvent::TaskUpdated { task }) => {
                assert_eq!(task.id, "t1");
                assert_eq!(task.status, TaskStatus::Review);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            parse_sse_line(r#"data: {"type":"task_deleted","id":"t9"}"#),
            Some(PushEvent::TaskDeleted { id: "t9".into() })
        );
    }

    #[test]
    fn ignores_non_data_lines() {
        assert_eq!(parse_sse_line(": keepalive"), None);
        assert_eq!(parse_sse_line("event: task"), None);
        assert_eq!(parse_sse_line("data:"), None);
        assert_eq!(parse_sse_line("data: {not json"), None);
    }

    #[test]
    fn connection_events_do_not_touch_tasks() {
        assert!(!PushEvent::Connected.touches_tasks());
        assert!(PushEvent::TaskDeleted { id: "x".into() }.touches_tasks());
    }
}
