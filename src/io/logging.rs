use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `tackle=debug`)
pub const LOG_ENV: &str = "TACKLE_LOG";

/// Default log file: `<cache dir>/tackle/tackle.log`
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tackle")
        .join("tackle.log")
}

/// Install a file-backed subscriber. The terminal belongs to the TUI, so
/// nothing is ever written to stdout or stderr.
pub fn init(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
