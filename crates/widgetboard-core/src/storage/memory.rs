//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::store::PersistedBoard;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral boards.
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<HashMap<String, PersistedBoard>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, key: &str, board: &PersistedBoard) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let board = board.clone();
        Box::pin(async move {
            let mut boards = self.boards.write().map_err(lock_error)?;
            boards.insert(key, board);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<PersistedBoard>> {
        let key = key.to_string();
        Box::pin(async move {
            let boards = self.boards.read().map_err(lock_error)?;
            boards.get(&key).cloned().ok_or(StorageError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut boards = self.boards.write().map_err(lock_error)?;
            boards.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let boards = self.boards.read().map_err(lock_error)?;
            Ok(boards.keys().cloned().collect())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let boards = self.boards.read().map_err(lock_error)?;
            Ok(boards.contains_key(&key))
        })
    }
}
