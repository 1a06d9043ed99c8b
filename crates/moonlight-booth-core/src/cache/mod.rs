mod artifact_cache;
mod memory_store;

pub use {
    artifact_cache::{
        ArtifactCache, CachedArtifacts, DEFAULT_MAX_PHOTO_BYTES, LAST_PHOTO_KEY, LAST_VIDEO_KEY,
    },
    memory_store::MemoryStore,
};

use crate::CoreResult;

/// Key-value blob store backing the last-artifact cache.
///
/// `open` is called once when a flow starts and `close` when it ends;
/// implementations that need no lifecycle keep the defaults.
pub trait ArtifactStore: Send + Sync {
    /// Prepares the store for use.
    fn open(&self) -> CoreResult<()> {
        Ok(())
    }

    /// Reads the blob under `key`.
    fn get(&self, key: &str) -> CoreResult<Option<Vec<u8>>>;

    /// Replaces the blob under `key`.
    fn put(&self, key: &str, bytes: &[u8]) -> CoreResult<()>;

    /// Flushes and releases the store.
    fn close(&self) -> CoreResult<()> {
        Ok(())
    }
}
