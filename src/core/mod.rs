pub mod command;
pub mod commands;
pub mod config;
pub mod env;
pub mod parser;
pub mod state;

pub use command::Command;
pub use config::ShellConfig;
pub use state::ShellState;
