use crate::{CoreResult, cache::ArtifactStore};

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use tracing::error;

/// Process-local [`ArtifactStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(|e| {
            error!("Memory store lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl ArtifactStore for MemoryStore {
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>> {
        Ok(self.lock().get(key).cloned())
    }

    fn put(&self, key: &str, bytes: &[u8]) -> CoreResult<()> {
        self.lock().insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
}
