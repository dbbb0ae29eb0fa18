pub mod app;
pub mod cli;
pub mod commands;

pub use app::AppContext;
