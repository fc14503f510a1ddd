//! Application startup: storage, restore and the shell loop.

use crate::config::AppConfig;
use crate::shell::Shell;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use widgetboard_core::storage::{
    AutoSaveManager, FileStorage, Storage, StorageError, create_default_storage,
};
use widgetboard_core::{Canvas, LayoutStore};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Open the configured storage, restore the board and serve stdin.
    pub fn run(self) -> Result<(), AppError> {
        let storage = match &self.config.storage_dir {
            Some(dir) => Arc::new(FileStorage::new(dir.clone())?),
            None => create_default_storage()?,
        };
        log::info!("Boards stored in {}", storage.base_path().display());

        let mut shell = self.open(storage);
        println!("{} (type `help` for commands)", self.config.title);
        shell.run(io::stdin().lock(), &mut io::stdout().lock())?;
        Ok(())
    }

    /// Build a shell over `storage`, restoring the persisted board.
    ///
    /// Unreadable data is logged and replaced by an empty board on the next save.
    pub fn open<S: Storage>(&self, storage: Arc<S>) -> Shell<S> {
        let mut autosave = AutoSaveManager::new(storage).with_key(self.config.persist_key.clone());
        autosave.set_interval(self.config.autosave_interval);

        let store = match pollster::block_on(autosave.restore()) {
            Ok(Some(board)) => LayoutStore::from_persisted(board),
            Ok(None) => LayoutStore::new(),
            Err(e) => {
                log::warn!(
                    "Could not restore board '{}', starting empty: {}",
                    self.config.persist_key,
                    e
                );
                LayoutStore::new()
            }
        };
        Shell::new(Canvas::with_store(store), autosave)
    }
}
