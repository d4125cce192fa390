use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tackle::cli::commands::Cli;
use tackle::cli::handlers;
use tackle::io::client::Repository;
use tackle::io::config_io;
use tackle::io::events;
use tackle::io::http::HttpRepository;
use tackle::io::logging;
use tackle::io::memory::MemoryRepository;
use tackle::model::AppConfig;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    if let Err(e) = logging::init(&log_path) {
        // Logging is best effort; the session still works without it
        eprintln!("warning: cannot open log file {}: {}", log_path.display(), e);
    }

    let mut config = config_io::load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    let repo: Arc<dyn Repository> = if cli.demo {
        Arc::new(MemoryRepository::demo())
    } else {
        Arc::new(HttpRepository::new(
            &config.server_url,
            Duration::from_secs(config.request_timeout_secs),
        )?)
    };

    match cli.command {
        // No subcommand → launch TUI
        None => {
            let push = (config.push_enabled && !cli.demo)
                .then(|| events::start_event_stream(&config.server_url));
            tackle::tui::run(&config, repo, push)
        }
        Some(command) => handlers::dispatch(command, cli.json, &config, repo.as_ref()),
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(poll) = cli.poll {
        config.poll_interval_secs = poll;
    }
    if cli.push {
        config.push_enabled = true;
    }
}
