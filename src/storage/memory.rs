use crate::model::Chapter;
use crate::storage::{SaveError, SaveResult, Saver};
use std::sync::{Arc, Mutex, PoisonError};

/// In-memory [`Saver`] that keeps every chapter it receives
///
/// Clones share the same store, so a handle kept by the caller sees what the
/// crawler saved through another handle.
#[derive(Debug, Clone, Default)]
pub struct MemorySaver {
    chapters: Arc<Mutex<Vec<Chapter>>>,
    fail_after: Option<usize>,
}

impl MemorySaver {
    /// Creates an empty saver
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a saver that rejects every chapter after the first `limit`
    pub fn failing_after(limit: usize) -> Self {
        Self {
            chapters: Arc::default(),
            fail_after: Some(limit),
        }
    }

    /// Returns the chapters saved so far, in arrival order
    pub fn chapters(&self) -> Vec<Chapter> {
        self.chapters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of chapters saved so far
    pub fn len(&self) -> usize {
        self.chapters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been saved
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Saver for MemorySaver {
    fn save(&mut self, chapter: &Chapter) -> SaveResult<()> {
        let mut chapters = self
            .chapters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(limit) = self.fail_after {
            if chapters.len() >= limit {
                return Err(SaveError::Write(format!(
                    "capacity of {} chapters reached",
                    limit
                )));
            }
        }

        chapters.push(chapter.clone());
        Ok(())
    }
}
