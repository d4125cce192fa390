use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tk", about = concat!("tackle v", env!("CARGO_PKG_VERSION"), " - your task server, in the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Server base URL (overrides the config file)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Config file to read instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use a built-in sample board instead of a server
    #[arg(long, global = true)]
    pub demo: bool,

    /// Write logs here instead of the cache directory
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Poll interval in seconds (0 disables polling)
    #[arg(long, global = true)]
    pub poll: Option<u64>,

    /// Listen for server push events
    #[arg(long, global = true)]
    pub push: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks, sorted and filtered the same way as the TUI
    Tasks(TasksArgs),
    /// List projects
    Projects,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Sort mode (status, priority, created, alpha)
    #[arg(long)]
    pub sort: Option<String>,
    /// Only these statuses, comma separated (todo,doing,review,done)
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,
    /// Only tasks with this feature tag (repeatable)
    #[arg(long)]
    pub feature: Vec<String>,
    /// Only tasks in this project
    #[arg(long)]
    pub project: Option<String>,
}
