//! Main application entry point.

use clap::Parser;
use widgetboard_app::{App, AppConfig, Cli};

fn main() {
    env_logger::init();

    let config = AppConfig::from(Cli::parse());
    log::info!("Starting {}", config.title);

    if let Err(e) = App::new(config).run() {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
