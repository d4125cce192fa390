pub mod task;
pub mod project;
pub mod prefs;
pub mod config;

pub use task::*;
pub use project::*;
pub use prefs::*;
pub use config::*;
