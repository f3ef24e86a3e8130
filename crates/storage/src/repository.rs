use async_trait::async_trait;
use bergen_core::model::WordChapter;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by word sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Source contract for word chapters.
#[async_trait]
pub trait WordRepository: Send + Sync {
    /// Load every available chapter, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no chapter could be loaded, or other storage errors.
    async fn load_chapters(&self) -> Result<Vec<WordChapter>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    chapters: Arc<Mutex<Vec<WordChapter>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_chapters(chapters: Vec<WordChapter>) -> Self {
        Self {
            chapters: Arc::new(Mutex::new(chapters)),
        }
    }

    /// Append a chapter.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the lock is poisoned.
    pub fn push_chapter(&self, chapter: WordChapter) -> Result<(), StorageError> {
        let mut guard = self
            .chapters
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        guard.push(chapter);
        Ok(())
    }
}

#[async_trait]
impl WordRepository for InMemoryRepository {
    async fn load_chapters(&self) -> Result<Vec<WordChapter>, StorageError> {
        let guard = self
            .chapters
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(guard.clone())
    }
}
