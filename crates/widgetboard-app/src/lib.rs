//! WidgetBoard application
//!
//! A headless shell over the board: commands on standard input, the board
//! persisted to disk between runs.

mod app;
mod commands;
mod config;
mod shell;

pub use app::{App, AppError};
pub use commands::{Command, CommandError, CommandHelp, CommandRegistry};
pub use config::{AppConfig, Cli};
pub use shell::{Flow, Shell};
