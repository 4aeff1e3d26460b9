pub mod app;
pub mod cli;
pub mod commands;
pub mod config;

pub use app::{build_assistant, open_persist};
pub use cli::Cli;
pub use config::Config;
