//! Auto-save for board persistence.
//!
//! Periodically writes the board so edits survive a restart.

use crate::storage::{FileStorage, Storage, StorageError, StorageResult};
use crate::store::{PERSIST_ROOT_KEY, PersistedBoard};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Manages automatic board persistence.
pub struct AutoSaveManager<S: Storage> {
    /// Storage backend.
    storage: Arc<S>,
    /// Key the board is stored under.
    key: String,
    /// Auto-save interval.
    interval: Duration,
    /// Last save timestamp.
    last_save: Option<Instant>,
    /// Whether the board has unsaved changes.
    dirty: bool,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager writing under [`PERSIST_ROOT_KEY`].
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            key: PERSIST_ROOT_KEY.to_string(),
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Set the auto-save interval.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the board as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if the board is dirty and the interval has elapsed.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }

        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save the board if needed (dirty + interval elapsed).
    /// Returns true if a save was performed.
    pub async fn maybe_save(&mut self, board: &PersistedBoard) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }

        self.save(board).await?;
        Ok(true)
    }

    /// Force save the board immediately.
    pub async fn save(&mut self, board: &PersistedBoard) -> StorageResult<()> {
        self.storage.save(&self.key, board).await?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::info!(
            "Saved board '{}' ({} widgets, {} undo steps)",
            self.key,
            board.items.len(),
            board.history.past.len()
        );
        Ok(())
    }

    /// Load the persisted board, if any.
    ///
    /// A missing board is `Ok(None)`; unreadable data is an error so the
    /// caller can decide whether to start fresh.
    pub async fn restore(&mut self) -> StorageResult<Option<PersistedBoard>> {
        match self.storage.load(&self.key).await {
            Ok(board) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                log::info!("Restored board '{}' ({} widgets)", self.key, board.items.len());
                Ok(Some(board))
            }
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete the persisted board.
    pub async fn delete(&self) -> StorageResult<()> {
        self.storage.delete(&self.key).await
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create file storage in the platform data directory.
pub fn create_default_storage() -> StorageResult<Arc<FileStorage>> {
    Ok(Arc::new(FileStorage::default_location()?))
}
