pub mod client;
pub mod config_io;
pub mod events;
pub mod http;
pub mod logging;
pub mod memory;
