//! Storage abstraction for board persistence.
//!
//! Persistence is a best-effort side channel: the store never waits on it,
//! and an [`AutoSaveManager`] decides when the current board is written.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, create_default_storage};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::store::PersistedBoard;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Board not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for board storage backends.
///
/// Boards are stored whole under a key; the application uses a single fixed
/// key ([`PERSIST_ROOT_KEY`](crate::store::PERSIST_ROOT_KEY)).
pub trait Storage: Send + Sync {
    /// Save a board.
    fn save(&self, key: &str, board: &PersistedBoard) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a board.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<PersistedBoard>>;

    /// Delete a board.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a board exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Drive a storage future to completion on the current thread.
///
/// The bundled backends never return `Pending`, so tests can poll them
/// without an executor.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, Waker};

    let mut cx = Context::from_waker(Waker::noop());
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
