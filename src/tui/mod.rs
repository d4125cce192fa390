pub mod app;
pub mod dispatch;
pub mod input;
pub mod keys;
pub mod message;
pub mod modal;
pub mod render;
pub mod state;
pub mod theme;
pub mod worker;

pub use app::run;
