//! Application configuration.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use widgetboard_core::PERSIST_ROOT_KEY;
use widgetboard_core::storage::DEFAULT_AUTOSAVE_INTERVAL_SECS;

const DEFAULT_TITLE: &str = "Widget Builder";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "widgetboard")]
#[command(
    version,
    about = "Widget board command shell",
    long_about = "Reads board commands from standard input; type `help` for the list."
)]
pub struct Cli {
    /// Directory boards are stored in (defaults to the platform data directory)
    #[arg(long, env = "WIDGETBOARD_DIR")]
    pub dir: Option<PathBuf>,

    /// Storage key the board is persisted under
    #[arg(long, default_value = PERSIST_ROOT_KEY)]
    pub key: String,

    /// Title printed when the shell starts
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Seconds between automatic saves
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_AUTOSAVE_INTERVAL_SECS)]
    pub autosave: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub title: String,
    /// Board directory; `None` uses the platform data directory.
    pub storage_dir: Option<PathBuf>,
    /// Storage key the board is persisted under.
    pub persist_key: String,
    pub autosave_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            storage_dir: None,
            persist_key: PERSIST_ROOT_KEY.to_string(),
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
        }
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            title: cli.title,
            storage_dir: cli.dir.filter(|dir| !dir.as_os_str().is_empty()),
            persist_key: cli.key,
            autosave_interval: Duration::from_secs(cli.autosave),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_app_config() {
        let cli = Cli::try_parse_from(["widgetboard"]).unwrap();
        let config = AppConfig::from(cli);
        assert_eq!(config.title, AppConfig::default().title);
        assert_eq!(config.persist_key, "root");
        assert_eq!(config.autosave_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "widgetboard",
            "--dir",
            "/from/flag",
            "--key",
            "demo",
            "--autosave",
            "5",
            "--title",
            "Demo board",
        ])
        .unwrap();
        let config = AppConfig::from(cli);
        assert_eq!(config.storage_dir, Some(PathBuf::from("/from/flag")));
        assert_eq!(config.persist_key, "demo");
        assert_eq!(config.autosave_interval, Duration::from_secs(5));
        assert_eq!(config.title, "Demo board");
    }

    #[test]
    fn test_dir_reads_environment() {
        let command = Cli::command();
        let dir = command
            .get_arguments()
            .find(|arg| arg.get_id() == "dir")
            .unwrap();
        assert_eq!(dir.get_env(), Some(std::ffi::OsStr::new("WIDGETBOARD_DIR")));
    }

    #[test]
    fn test_errors() {
        assert!(Cli::try_parse_from(["widgetboard", "--key"]).is_err());
        assert!(Cli::try_parse_from(["widgetboard", "--autosave", "soon"]).is_err());
        assert!(Cli::try_parse_from(["widgetboard", "--verbose"]).is_err());
    }
}
